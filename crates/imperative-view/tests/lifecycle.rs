use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use imperative_core::{Controller, Error as CoreError, Instance, Lifecycle, Rejection};
use imperative_testing::{run_test_render, ImperativeTestRule};
use imperative_view::{Error, InjectedProps, View};

fn toast(props: &InjectedProps<&'static str, String>) -> View {
    View::element("toast")
        .attr("active", props.is_active().to_string())
        .child(props.props)
        .into()
}

fn active_of(rule: &ImperativeTestRule, controller: &Controller<String>) -> Option<String> {
    rule.content_of(controller)?
        .find("toast")
        .and_then(|element| element.attribute("active"))
        .map(str::to_owned)
}

#[test]
fn indices_grow_while_live_and_restart_once_empty() {
    run_test_render(|rule| {
        let first = rule.render(toast, "a").expect("first");
        let second = rule.render(toast, "b").expect("second");
        assert_eq!((first.index(), second.index()), (1, 2));
        assert_eq!(rule.registry().indices(), vec![1, 2]);

        first.destroy();
        rule.pump_until_idle();
        let third = rule.render(toast, "c").expect("third");
        assert_eq!(third.index(), 3);

        second.destroy();
        third.destroy();
        rule.pump_until_idle();
        assert!(rule.registry().is_empty());

        let fresh = rule.render(toast, "d").expect("fresh");
        assert_eq!(fresh.index(), 1);
    });
}

#[test]
fn async_rejection_unmounts_exactly_once() {
    run_test_render(|rule| {
        let handle: Rc<RefCell<Option<Controller<String>>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&handle);
        let promise = rule
            .render_async(
                move |props: &InjectedProps<(), String>| {
                    sink.borrow_mut().get_or_insert_with(|| props.controller.clone());
                    View::text("busy")
                },
                (),
            )
            .expect("render");
        let controller = handle.borrow().clone().expect("rendered");

        controller.reject("x");
        controller.reject("y");
        controller.destroy();

        assert_eq!(rule.block_on(promise), Some(Err(Rejection::new("x"))));
        assert_eq!(rule.mounts(), 1);
        assert_eq!(rule.unmounts(), 1);
        assert_eq!(controller.lifecycle(), Lifecycle::Destroyed);
        assert_eq!(rule.markup(), "");
    });
}

#[test]
fn wait_until_pauses_the_view_for_a_nested_dialog() {
    run_test_render(|rule| {
        let outer = rule.render(toast, "Delete file?").expect("outer");
        let (answer_tx, answer_rx) = oneshot::channel::<bool>();

        let pending = outer.wait_until(answer_rx).expect("mounted");
        assert_eq!(active_of(rule, &outer).as_deref(), Some("false"));
        assert_eq!(outer.lifecycle(), Lifecycle::Inactive);

        let confirm = rule.render(toast, "Are you sure?").expect("nested");
        assert_eq!(confirm.index(), 2);
        assert_eq!(active_of(rule, &confirm).as_deref(), Some("true"));

        let _ = answer_tx.send(true);
        let answer = rule.block_on(pending);

        assert_eq!(answer, Some(Ok(true)));
        assert_eq!(active_of(rule, &outer).as_deref(), Some("true"));
    });
}

#[test]
fn failed_nested_task_still_reactivates() {
    run_test_render(|rule| {
        let outer = rule.render(toast, "Upload").expect("outer");
        let failing = async { Err::<(), _>(Rejection::new("network")) };

        let pending = outer.wait_until(failing).expect("mounted");
        let output = rule.block_on(pending);

        assert_eq!(output, Some(Err(Rejection::new("network"))));
        assert!(outer.is_active());
        assert_eq!(active_of(rule, &outer).as_deref(), Some("true"));
    });
}

#[test]
fn double_create_is_reported_through_the_view_error() {
    run_test_render(|rule| {
        let controller = rule.render(toast, "once").expect("render");

        let err = Error::from(controller.create().unwrap_err());

        assert_eq!(err, Error::Core(CoreError::DoubleCreate { index: 1 }));
        assert_eq!(rule.mounts(), 1);
    });
}

#[test]
fn clearing_the_registry_tears_down_every_instance() {
    run_test_render(|rule| {
        let controllers: Vec<Controller<String>> = ["a", "b", "c"]
            .into_iter()
            .map(|label| rule.render(toast, label).expect("render"))
            .collect();

        rule.registry().clear_with(|instance| instance.destroy());
        assert!(rule.registry().is_empty());
        rule.pump_until_idle();

        assert_eq!(rule.unmounts(), 3);
        assert!(controllers.iter().all(Controller::is_destroyed));
        assert_eq!(rule.registry().next_index(), 1);
    });
}
