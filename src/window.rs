//! Desktop window variant of the feedback dialog
//!
//! Each question opens a small eframe window with a white "Original" and
//! a red "Changed" button and returns once one is clicked. The first
//! window is centered on the monitor and shifted right by the session's
//! x-offset in pixels; later windows open where the previous one was
//! left. Closing the window without answering counts as an interruption.

use anyhow::Result;
use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;

use crate::bisect::{Probe, Response};
use crate::dialog::{self, DialogSession, FeedbackDialog, TerminalDialog, DIALOG_TITLE};
use crate::interrupt::{self, Interrupted};

const WINDOW_SIZE: [f32; 2] = [400.0, 200.0];
const BUTTON_SIZE: [f32; 2] = [170.0, 70.0];
const CHANGED_RED: egui::Color32 = egui::Color32::from_rgb(0xff, 0x00, 0x00);

/// What the window reports back once it closes
#[derive(Debug, Default)]
struct WindowOutcome {
    response: Option<Response>,
    /// Outer top-left corner, in points, at the time of the answer
    position: Option<(i32, i32)>,
}

struct FeedbackWindow {
    text: String,
    /// Session to center the window with, until that has happened
    centering: Option<DialogSession>,
    outcome: Rc<RefCell<WindowOutcome>>,
}

impl FeedbackWindow {
    fn finish(&self, ctx: &egui::Context, response: Option<Response>) {
        let position = ctx
            .input(|i| i.viewport().outer_rect)
            .map(|rect| (rect.min.x.round() as i32, rect.min.y.round() as i32));

        let mut outcome = self.outcome.borrow_mut();
        outcome.response = response;
        outcome.position = position;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn center(ctx: &egui::Context, session: &DialogSession) -> bool {
        let Some(monitor) = ctx.input(|i| i.viewport().monitor_size) else {
            return false;
        };
        let (x, y) = session.centered(
            (monitor.x as i32, monitor.y as i32),
            (WINDOW_SIZE[0] as i32, WINDOW_SIZE[1] as i32),
        );
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
            x as f32, y as f32,
        )));
        true
    }
}

/// Answer picked by a key press, if any
fn answer_for_key(key: egui::Key) -> Option<Response> {
    match key {
        egui::Key::O | egui::Key::N => Some(Response::NoVisibleChange),
        egui::Key::C | egui::Key::Y => Some(Response::VisibleChange),
        _ => None,
    }
}

impl eframe::App for FeedbackWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self
            .centering
            .as_ref()
            .is_some_and(|session| Self::center(ctx, session))
        {
            self.centering = None;
        }

        if interrupt::is_interrupted() || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.finish(ctx, None);
            return;
        }

        let mut answer = ctx.input(|i| {
            i.events.iter().find_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } if modifiers.is_none() => answer_for_key(*key),
                _ => None,
            })
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(egui::RichText::new("The target color is:").size(18.0));
                ui.label(egui::RichText::new(&self.text).small().weak());
                ui.add_space(10.0);
            });

            ui.horizontal(|ui| {
                ui.add_space(10.0);
                let original = egui::Button::new(
                    egui::RichText::new("Original").color(egui::Color32::BLACK),
                )
                .fill(egui::Color32::WHITE)
                .min_size(BUTTON_SIZE.into());
                if ui.add(original).clicked() {
                    answer = Some(Response::NoVisibleChange);
                }

                ui.add_space((ui.available_width() - BUTTON_SIZE[0] - 10.0).max(0.0));
                let changed = egui::Button::new(
                    egui::RichText::new("Changed").color(egui::Color32::WHITE),
                )
                .fill(CHANGED_RED)
                .min_size(BUTTON_SIZE.into());
                if ui.add(changed).clicked() {
                    answer = Some(Response::VisibleChange);
                }
            });
        });

        if let Some(response) = answer {
            self.finish(ctx, Some(response));
            return;
        }

        // Wake up now and then so Ctrl-C in the terminal is noticed
        ctx.request_repaint_after(dialog::POLL_INTERVAL);
    }
}

/// Feedback dialog shown as a desktop window
///
/// If no window can be opened at all (no display, missing graphics
/// driver), the dialog falls back to the terminal popup for the rest of
/// the run.
#[derive(Debug, Default)]
pub struct WindowDialog {
    opened_once: bool,
    fallback: Option<TerminalDialog>,
}

impl WindowDialog {
    pub fn new() -> Self {
        Self::default()
    }

    fn show(&mut self, probe: &Probe, session: &mut DialogSession) -> Result<Response> {
        let outcome = Rc::new(RefCell::new(WindowOutcome::default()));

        let mut viewport = egui::ViewportBuilder::default()
            .with_title(DIALOG_TITLE)
            .with_inner_size(WINDOW_SIZE)
            .with_resizable(false);
        if let Some((x, y)) = session.position() {
            viewport = viewport.with_position([x as f32, y as f32]);
        }
        let options = eframe::NativeOptions {
            viewport,
            run_and_return: true,
            ..Default::default()
        };

        let app = FeedbackWindow {
            text: dialog::question(probe),
            centering: session.position().is_none().then(|| session.clone()),
            outcome: Rc::clone(&outcome),
        };

        eframe::run_native(DIALOG_TITLE, options, Box::new(move |_cc| Ok(Box::new(app))))
            .map_err(|e| anyhow::anyhow!("Failed to open dialog window: {}", e))?;
        self.opened_once = true;

        let WindowOutcome { response, position } = outcome.take();
        if let Some(position) = position {
            session.remember(position);
        }

        interrupt::check()?;
        response.ok_or_else(|| Interrupted.into())
    }
}

impl FeedbackDialog for WindowDialog {
    fn ask(&mut self, probe: &Probe, session: &mut DialogSession) -> Result<Response> {
        if let Some(fallback) = self.fallback.as_mut() {
            return fallback.ask(probe, session);
        }

        match self.show(probe, session) {
            Err(e) if !self.opened_once && e.downcast_ref::<Interrupted>().is_none() => {
                tracing::warn!("{:#}", e);
                eprintln!("Warning: {:#}; using the terminal popup instead", e);
                session.forget_position();
                self.fallback.insert(TerminalDialog::new()).ask(probe, session)
            }
            result => result,
        }
    }
}
