use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use imperative_core::{Controller, Rejection, RuntimeHandle};
use imperative_view::{async_imperative_render, InjectedProps, RenderOptions, Result, View};

pub type AnswerHandler = Rc<dyn Fn(&Controller<bool>, bool)>;

/// Props of [`confirm_dialog`].
pub struct Prompt {
    pub message: &'static str,
    pub inbox: Inbox,
    pub on_answer: AnswerHandler,
}

/// Dialogs waiting for the simulated user, oldest first.
#[derive(Clone, Default)]
pub struct Inbox {
    waiting: Rc<RefCell<Vec<(Controller<bool>, AnswerHandler)>>>,
}

impl Inbox {
    fn offer(&self, controller: &Controller<bool>, handler: &AnswerHandler) {
        let mut waiting = self.waiting.borrow_mut();
        if !waiting.iter().any(|(known, _)| known == controller) {
            waiting.push((controller.clone(), Rc::clone(handler)));
        }
    }

    /// The topmost dialog that can take input right now.
    pub fn next(&self) -> Option<Click> {
        let mut waiting = self.waiting.borrow_mut();
        waiting.retain(|(controller, _)| !controller.is_settled() && !controller.is_destroyed());
        waiting
            .iter()
            .rev()
            .find(|(controller, _)| controller.is_active())
            .map(|(controller, handler)| Click {
                controller: controller.clone(),
                handler: Rc::clone(handler),
            })
    }
}

/// A pending answer to one dialog.
pub struct Click {
    controller: Controller<bool>,
    handler: AnswerHandler,
}

impl Click {
    pub fn index(&self) -> usize {
        self.controller.index()
    }

    /// Delivers the answer as an input event on the next turn.
    pub fn answer(self, runtime: &RuntimeHandle, yes: bool) {
        runtime.spawn_task(Box::new(move || (self.handler)(&self.controller, yes)));
    }
}

fn button(label: &str, enabled: bool) -> View {
    let button = View::element("button");
    let button = if enabled {
        button
    } else {
        button.attr("disabled", "")
    };
    button.child(label.to_owned()).into()
}

pub fn confirm_dialog(props: &InjectedProps<Prompt, bool>) -> View {
    let prompt = &props.props;
    let active = props.is_active();
    prompt.inbox.offer(&props.controller, &prompt.on_answer);

    View::element("dialog")
        .attr("data-index", props.controller.index().to_string())
        .attr("data-active", active.to_string())
        .child(View::element("p").child(prompt.message))
        .child(button("Cancel", active))
        .child(button("OK", active))
        .into()
}

/// Answers the dialog directly.
pub fn settle_with_answer() -> AnswerHandler {
    Rc::new(|controller: &Controller<bool>, yes: bool| {
        controller.resolve(yes);
    })
}

/// On "yes", pauses the dialog while an "are you sure?" dialog runs and
/// resolves with both answers combined. On "no", resolves right away.
pub fn double_check(inbox: Inbox, runtime: RuntimeHandle) -> AnswerHandler {
    Rc::new(move |controller: &Controller<bool>, yes: bool| {
        if !yes {
            controller.resolve(false);
            return;
        }
        let paused = match pause_for_nested(controller, &inbox) {
            Ok(paused) => paused,
            Err(err) => {
                log::error!("could not open the nested dialog: {err}");
                controller.reject("nested dialog failed");
                return;
            }
        };
        let controller = controller.clone();
        runtime.spawn_local(async move {
            let sure = paused.await;
            log::info!("nested dialog answered {sure:?}");
            controller.resolve(matches!(sure, Ok(true)));
        });
    })
}

fn pause_for_nested(
    controller: &Controller<bool>,
    inbox: &Inbox,
) -> Result<impl Future<Output = std::result::Result<bool, Rejection>>> {
    let prompt = Prompt {
        message: "Are you sure? This cannot be undone.",
        inbox: inbox.clone(),
        on_answer: settle_with_answer(),
    };
    let nested = async_imperative_render(confirm_dialog, prompt, RenderOptions::new())?;
    Ok(controller.wait_until(nested)?)
}
