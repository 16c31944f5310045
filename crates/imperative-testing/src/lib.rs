//! Testing utilities and harness for imperative rendering

pub mod testing;

pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
}
