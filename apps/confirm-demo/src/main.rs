mod config;
mod dialog;

use std::process::ExitCode;
use std::rc::Rc;

use imperative_core::Document;
use imperative_runtime_std::StdRuntime;
use imperative_view::{imperative_render, ImperativeRender, MemoryDocument, RenderOptions};

use config::EnvConfig;
use dialog::{confirm_dialog, double_check, Inbox, Prompt};

fn main() -> ExitCode {
    env_logger::init();
    let config = EnvConfig::from_env();

    println!("=== Imperative confirm dialog ===");
    println!(
        "auto answers: first={} nested={}",
        yes_no(config.auto_answer),
        yes_no(config.nested_answer)
    );
    println!();

    match run(&config) {
        Ok(Some(decision)) => {
            println!("decision: {}", if decision { "delete" } else { "keep" });
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("decision: none");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("confirm demo failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &EnvConfig) -> imperative_view::Result<Option<bool>> {
    let host = StdRuntime::new();
    let runtime = host.runtime_handle();
    let document = MemoryDocument::new();
    imperative_view::install(Rc::new(ImperativeRender::new(
        Rc::clone(&document),
        runtime.clone(),
    )));

    let inbox = Inbox::default();
    let outer = imperative_render(
        confirm_dialog,
        Prompt {
            message: "Delete report.pdf?",
            inbox: inbox.clone(),
            on_answer: double_check(inbox.clone(), runtime.clone()),
        },
        RenderOptions::new(),
    )?;

    let mut step = 0;
    loop {
        let turns = host.pump();
        print_document(step, turns, &document);
        let Some(click) = inbox.next() else {
            break;
        };
        // The topmost dialog is the nested one whenever it is open.
        let answer = if click.index() == outer.index() {
            config.auto_answer
        } else {
            config.nested_answer
        };
        println!("user answers {} to dialog #{}", yes_no(answer), click.index());
        click.answer(&runtime, answer);
        step += 1;
    }

    let decision = outer.promise().peek().and_then(Result::ok);
    outer.destroy();
    let turns = host.pump();
    print_document(step + 1, turns, &document);
    warn_on_leftovers(&document);

    imperative_view::uninstall();
    Ok(decision)
}

/// Logs containers still attached to the body. Returns whether any were.
fn warn_on_leftovers(document: &MemoryDocument) -> bool {
    let leftovers = !document.children(document.body()).is_empty();
    if leftovers {
        log::warn!("containers still attached after teardown: {}", document.markup());
    }
    leftovers
}

fn print_document(step: usize, turns: u64, document: &MemoryDocument) {
    let markup = document.markup();
    let shown = if markup.is_empty() { "<empty>" } else { markup.as_str() };
    println!("[step {step}, {turns} turn(s)] {shown}");
}

fn yes_no(answer: bool) -> &'static str {
    if answer {
        "yes"
    } else {
        "no"
    }
}
