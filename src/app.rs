use crate::auth::{Credentials, IdentityProvider, User};
use crate::event::AppEvent;
use crate::notify::{Notification, Toasts};
use crate::prefs::{PreferenceStore, Preferences};
use crate::session::coordinator::{Clipboard, ClipboardError, SendCoordinator, ViewEvent};
use crate::session::{Message, Sender};
use crate::theme::Theme;
use chrono::{DateTime, Local, Utc};
use eframe::egui::{self, Align, Align2, Layout, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::warn;
use uuid::Uuid;

struct Suggestion {
    title: &'static str,
    description: &'static str,
    prompt: &'static str,
}

const SUGGESTIONS: [Suggestion; 4] = [
    Suggestion {
        title: "Code Help",
        description: "Help me debug my JavaScript code",
        prompt: "Can you help me debug a JavaScript function that's not working properly?",
    },
    Suggestion {
        title: "Creative Ideas",
        description: "Brainstorm ideas for my project",
        prompt: "I need creative ideas for a web development project. Can you help me brainstorm?",
    },
    Suggestion {
        title: "Learning",
        description: "Explain complex concepts simply",
        prompt: "Can you explain how machine learning works in simple terms?",
    },
    Suggestion {
        title: "Quick Answers",
        description: "Get instant answers to questions",
        prompt: "What are the latest trends in web development?",
    },
];

const BUSY_POLL: Duration = Duration::from_millis(100);

struct EguiClipboard<'a>(&'a egui::Context);

impl Clipboard for EguiClipboard<'_> {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.0.copy_text(text.to_string());
        Ok(())
    }
}

fn format_time(created_at: DateTime<Utc>) -> String {
    created_at.with_timezone(&Local).format("%H:%M").to_string()
}

pub struct AriaApp {
    rx: Receiver<AppEvent>,
    coordinator: SendCoordinator,
    identity: Box<dyn IdentityProvider>,
    auth_required: bool,
    user: Option<User>,
    sign_in_form: Credentials,
    sign_in_error: Option<String>,
    prefs_store: Option<PreferenceStore>,
    prefs: Preferences,
    theme: Theme,
    visuals_dirty: bool,
    input_buffer: String,
    toasts: Toasts,
    scroll_to_bottom: bool,
}

impl AriaApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        coordinator: SendCoordinator,
        identity: Box<dyn IdentityProvider>,
        auth_required: bool,
        prefs_store: Option<PreferenceStore>,
    ) -> Self {
        let prefs = match prefs_store.as_ref().map(PreferenceStore::load) {
            Some(Ok(prefs)) => prefs,
            Some(Err(err)) => {
                warn!(error = %err, "using default preferences");
                Preferences::default()
            }
            None => Preferences::default(),
        };
        let user = identity.current_user().cloned();

        Self {
            rx,
            coordinator,
            identity,
            auth_required,
            user,
            sign_in_form: Credentials::default(),
            sign_in_error: None,
            prefs_store,
            prefs,
            theme: Theme::for_mode(prefs.dark_mode),
            visuals_dirty: true,
            input_buffer: String::new(),
            toasts: Toasts::default(),
            scroll_to_bottom: false,
        }
    }

    fn toggle_theme(&mut self) {
        self.prefs.dark_mode = !self.prefs.dark_mode;
        self.theme = Theme::for_mode(self.prefs.dark_mode);
        self.visuals_dirty = true;

        if let Some(store) = &self.prefs_store {
            if let Err(err) = store.save(&self.prefs) {
                warn!(error = %err, path = %store.path().display(), "failed to persist theme preference");
            }
        }
    }

    fn submit(&mut self, text: &str) {
        if self.coordinator.submit(text).is_accepted() {
            self.input_buffer.clear();
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CompletionSettled { generation, result } => {
                self.coordinator.settle(generation, result);
            }
            AppEvent::AuthStateChanged(user) => {
                if user.is_none() {
                    self.coordinator.reset();
                    self.toasts.push(Notification::info("Signed out"), Instant::now());
                }
                self.user = user;
            }
        }
    }

    fn apply_view_events(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        for event in self.coordinator.take_view_events() {
            match event {
                ViewEvent::TranscriptChanged => self.scroll_to_bottom = true,
                ViewEvent::BusyChanged(_) => {}
                ViewEvent::Notify(notification) => self.toasts.push(notification, now),
            }
            ctx.request_repaint();
        }
        self.toasts.prune(now);
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut new_chat = false;
        let mut toggle_theme = false;
        let mut sign_out = false;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("ARIA").color(self.theme.accent_primary).strong());
                ui.label(
                    RichText::new(format!("via {}", self.coordinator.backend_name()))
                        .color(self.theme.text_muted)
                        .small(),
                );

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if self.user.is_some() && ui.button("Sign out").clicked() {
                        sign_out = true;
                    }
                    let theme_label = if self.prefs.dark_mode { "☀ Light" } else { "🌙 Dark" };
                    toggle_theme = ui.button(theme_label).clicked();
                    new_chat = ui.button("＋ New chat").clicked();
                    if let Some(user) = &self.user {
                        ui.label(RichText::new(&user.name).color(self.theme.text_muted))
                            .on_hover_text(&user.email);
                    }
                });
            });
        });

        if new_chat {
            self.coordinator.new_chat();
        }
        if toggle_theme {
            self.toggle_theme();
        }
        if sign_out {
            self.identity.sign_out();
        }
    }

    fn render_composer(&mut self, ctx: &egui::Context) {
        let busy = self.coordinator.is_busy();
        let hint = if busy {
            "ARIA is thinking..."
        } else {
            "Message ARIA..."
        };

        let mut send_now = false;
        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_8);
            ui.horizontal(|ui| {
                let response = ui.add_enabled(
                    !busy,
                    egui::TextEdit::singleline(&mut self.input_buffer)
                        .desired_width(ui.available_width() - 80.0)
                        .hint_text(hint),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    send_now = true;
                    response.request_focus();
                }

                let label = if busy { "…" } else { "Send" };
                send_now |= ui
                    .add_enabled(
                        !busy && !self.input_buffer.trim().is_empty(),
                        egui::Button::new(label),
                    )
                    .clicked();
            });
            ui.add_space(self.theme.spacing_8);
        });

        if send_now {
            let text = self.input_buffer.clone();
            self.submit(&text);
        }
    }

    fn render_welcome(&mut self, ui: &mut egui::Ui) {
        let mut picked: Option<&'static str> = None;
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(RichText::new("Welcome to ARIA").size(30.0).color(self.theme.accent_primary));
            ui.label(
                RichText::new(
                    "Your Adaptive Reasoning & Intelligence Assistant. Ask me anything and I'll help you find the answers you need.",
                )
                .color(self.theme.text_muted),
            );
            ui.add_space(24.0);

            egui::Grid::new("suggestions")
                .num_columns(2)
                .spacing([16.0, 16.0])
                .show(ui, |ui| {
                    for (index, suggestion) in SUGGESTIONS.iter().enumerate() {
                        let response = self
                            .theme
                            .card_frame()
                            .show(ui, |ui| {
                                ui.set_width(260.0);
                                ui.strong(suggestion.title);
                                ui.label(
                                    RichText::new(suggestion.description).color(self.theme.text_muted),
                                );
                            })
                            .response
                            .interact(egui::Sense::click());
                        if response.clicked() {
                            picked = Some(suggestion.prompt);
                        }
                        if index % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
        });

        if let Some(prompt) = picked {
            self.submit(prompt);
        }
    }

    fn render_message(&self, ui: &mut egui::Ui, message: &Message) -> bool {
        let is_user = message.sender == Sender::User;
        let fill = if is_user {
            self.theme.user_bubble
        } else {
            self.theme.assistant_bubble
        };
        let layout = if is_user {
            Layout::top_down(Align::Max)
        } else {
            Layout::top_down(Align::Min)
        };

        let mut copy_clicked = false;
        ui.with_layout(layout, |ui| {
            self.theme.bubble_frame(fill).show(ui, |ui| {
                ui.set_max_width(ui.available_width() * 0.75);
                ui.horizontal(|ui| {
                    ui.strong(message.sender.display_name());
                    ui.label(
                        RichText::new(format_time(message.created_at))
                            .small()
                            .color(self.theme.text_muted),
                    );
                });
                ui.label(&message.content);
                if !is_user && ui.small_button("Copy").clicked() {
                    copy_clicked = true;
                }
            });
        });
        copy_clicked
    }

    fn render_transcript(&mut self, ui: &mut egui::Ui) {
        let mut copy_request: Option<Uuid> = None;
        ScrollArea::vertical()
            .id_salt("chat_transcript")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for message in self.coordinator.transcript().messages() {
                    if self.render_message(ui, message) {
                        copy_request = Some(message.id);
                    }
                }

                if self.coordinator.is_busy() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("ARIA is thinking...").color(self.theme.text_muted));
                    });
                }

                if self.scroll_to_bottom {
                    ui.scroll_to_cursor(Some(Align::BOTTOM));
                }
            });
        self.scroll_to_bottom = false;

        if let Some(id) = copy_request {
            let ctx = ui.ctx().clone();
            self.coordinator.copy_message(id, &mut EguiClipboard(&ctx));
        }
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.coordinator.transcript().is_empty() && !self.coordinator.is_busy() {
                self.render_welcome(ui);
            } else {
                self.render_transcript(ui);
            }
        });
    }

    fn render_sign_in(&mut self, ctx: &egui::Context) {
        let mut submitted = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading(RichText::new("Sign in to ARIA").color(self.theme.accent_primary));
                ui.add_space(16.0);
                self.theme.card_frame().show(ui, |ui| {
                    ui.set_width(320.0);
                    ui.label("Email");
                    ui.text_edit_singleline(&mut self.sign_in_form.email);
                    ui.label("Display name");
                    let name = ui.text_edit_singleline(&mut self.sign_in_form.name);
                    if name.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submitted = true;
                    }
                    if let Some(error) = &self.sign_in_error {
                        ui.label(RichText::new(error).color(self.theme.danger));
                    }
                    submitted |= ui.button("Sign in").clicked();
                });
            });
        });

        if submitted {
            match self.identity.sign_in(&self.sign_in_form) {
                Ok(user) => {
                    self.sign_in_error = None;
                    self.sign_in_form = Credentials::default();
                    self.toasts.push(
                        Notification::success(format!("Welcome, {}!", user.name)),
                        Instant::now(),
                    );
                }
                Err(err) => self.sign_in_error = Some(err.to_string()),
            }
        }
    }

    fn render_toasts(&self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_TOP, [-16.0, 56.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for notification in self.toasts.active() {
                    self.theme.toast_frame(notification.kind).show(ui, |ui| {
                        ui.label(&notification.text);
                    });
                }
            });
    }
}

impl eframe::App for AriaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.visuals_dirty {
            self.theme.apply_visuals(ctx);
            self.visuals_dirty = false;
        }

        self.drain_events();
        self.apply_view_events(ctx);

        if self.auth_required && self.user.is_none() {
            self.render_sign_in(ctx);
        } else {
            self.render_top_bar(ctx);
            self.render_composer(ctx);
            self.render_center_panel(ctx);
        }
        self.render_toasts(ctx);

        if self.coordinator.is_busy() {
            ctx.request_repaint_after(BUSY_POLL);
        } else if !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
