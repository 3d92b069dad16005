//! eframe application shell wiring the board client to the server.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use charboard_core::{BoardClient, ConnectionState, EntryKey, NativeWebSocket, SyncEvent};
use egui::{Color32, RichText};
use log::warn;

/// Current wall-clock time in milliseconds since epoch.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct CharboardApp {
    client: BoardClient,
    socket: NativeWebSocket,
    password: String,
    /// Alert-style notice, shown until dismissed.
    notice: Option<String>,
}

impl CharboardApp {
    pub fn new(url: &str) -> Self {
        let mut socket = NativeWebSocket::new();
        if let Err(e) = socket.connect(url) {
            warn!("connection failed: {e}");
        }
        Self {
            client: BoardClient::new(),
            socket,
            password: String::new(),
            notice: None,
        }
    }

    /// Drain socket events into the client, then flush its queued writes.
    fn pump(&mut self) {
        for event in self.socket.poll_events() {
            self.client.handle_event(event);
        }
        for msg in self.client.take_outgoing() {
            if let Err(e) = self.socket.send(&msg) {
                warn!("send failed: {e}");
                // The write never left this machine; the client must see
                // it fail like any other rejected write.
                self.client.handle_event(SyncEvent::Error {
                    message: format!("send failed: {e}"),
                });
            }
        }
        if let Some(notice) = self.client.take_notice() {
            self.notice = Some(notice);
        }
    }

    fn connection_label(&self) -> Option<&'static str> {
        match self.socket.state() {
            ConnectionState::Connected => None,
            ConnectionState::Connecting => Some("서버에 연결하는 중..."),
            ConnectionState::Disconnected | ConnectionState::Error => {
                Some("서버에 연결되어 있지 않습니다.")
            }
        }
    }
}

impl eframe::App for CharboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump();

        let now = now_ms();
        let status = self.client.cooldown(now);
        let view = self.client.view();
        let mut delete_keys: Vec<EntryKey> = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("한 글자 협동 글쓰기");
            if let Some(label) = self.connection_label() {
                ui.colored_label(Color32::LIGHT_RED, label);
            }
            ui.separator();

            // Board text, scrolled to the newest character.
            egui::ScrollArea::vertical()
                .max_height(260.0)
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if self.client.is_admin() {
                        ui.horizontal_wrapped(|ui| {
                            ui.spacing_mut().item_spacing.x = 2.0;
                            for row in &view.rows {
                                let text = if row.highlighted {
                                    RichText::new(&row.ch)
                                        .size(18.0)
                                        .background_color(Color32::from_rgb(90, 70, 0))
                                } else {
                                    RichText::new(&row.ch).size(18.0)
                                };
                                ui.label(text);
                                if row.deletable && ui.small_button("✕").clicked() {
                                    delete_keys.push(row.key.clone());
                                }
                            }
                        });
                    } else {
                        ui.label(RichText::new(&view.text).size(18.0));
                    }
                });

            ui.separator();
            ui.label(status.message());
            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(self.client.input_mut())
                        .desired_width(80.0)
                        .hint_text("한 글자"),
                );
                // Disabled until the first timestamp delivery arrives.
                let can_submit = self.client.is_synced() && status.is_ready();
                let clicked = ui
                    .add_enabled(can_submit, egui::Button::new("입력"))
                    .clicked();
                if clicked {
                    self.client.submit(now_ms());
                }
            });

            ui.separator();
            if self.client.is_admin() {
                if let Some(msg) = self.client.admin_status() {
                    ui.label(msg);
                }
            } else {
                ui.collapsing("관리자", |ui| {
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.password)
                                .desired_width(120.0)
                                .password(true)
                                .hint_text("비밀번호"),
                        );
                        if ui.button("로그인").clicked() {
                            let password = std::mem::take(&mut self.password);
                            self.client.login(&password, now_ms());
                        }
                    });
                    if let Some(msg) = self.client.admin_status() {
                        ui.label(msg);
                    }
                });
            }
        });

        for key in &delete_keys {
            self.client.delete_entry(key);
        }

        if let Some(notice) = self.notice.clone() {
            egui::Window::new("알림")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(notice);
                    if ui.button("확인").clicked() {
                        self.notice = None;
                    }
                });
        }

        // The repaint cadence drives both the countdown tick and sync
        // polling; the countdown only needs whole seconds.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
