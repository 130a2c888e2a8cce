use iced::{
    Element, Length, Task, Color, Border, Subscription,
};
use iced::alignment;
use iced::keyboard::{self, key};
use iced::widget::{
    Column, Row, Container, Text, Button, TextInput, Space, rule,
};

use crate::compare;
use crate::coordinator::ChecksumCoordinator;
use crate::models::*;
use crate::utils;
use std::path::PathBuf;
use rfd::FileDialog;

#[derive(Debug, Clone, PartialEq)]
pub enum Theme {
    Light,
    Dark,
}

#[derive(Debug, Clone)]
pub enum Message {
    ChooseFile,
    FileChosen(Option<PathBuf>),
    SessionComplete(Option<CompletedSession>),
    ExpectedChanged(String),
    LoadHashFile,
    HashFileLoaded(Option<String>),
    ToggleTheme,
    Quit,
}

pub struct VeriFileApp {
    coordinator: ChecksumCoordinator,

    // UI state
    chosen_file: Option<PathBuf>,
    expected: String,
    /// Session whose results we are waiting for.
    pending: Option<SessionId>,
    results: Option<CompletedSession>,
    outcome: MatchOutcome,
    status_message: String,
    theme: Theme,
}

impl VeriFileApp {
    pub fn new(
        coordinator: ChecksumCoordinator,
        file: Option<PathBuf>,
        expected: String,
        dark_mode: bool,
    ) -> (Self, Task<Message>) {
        let mut app = VeriFileApp {
            coordinator,
            chosen_file: None,
            expected,
            pending: None,
            results: None,
            outcome: MatchOutcome::EmptyExpected,
            status_message: "Choose a file...".to_string(),
            theme: if dark_mode { Theme::Dark } else { Theme::Light },
        };
        let task = match file {
            Some(path) => app.start_session(path),
            None => Task::none(),
        };
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseFile => {
                return Task::perform(async {
                    FileDialog::new().set_title("Choose File").set_directory(".").pick_file()
                }, Message::FileChosen);
            }
            Message::FileChosen(Some(path)) => {
                return self.start_session(path);
            }
            Message::FileChosen(None) => { /* cancelled */ }
            Message::SessionComplete(Some(session)) => {
                if self.pending != Some(session.id) || !self.coordinator.is_current(session.id) {
                    tracing::debug!(session = %session.id, "ignoring stale checksum session");
                    return Task::none();
                }
                self.pending = None;
                self.results = Some(session);
                self.refresh_outcome();
            }
            // Superseded sessions resolve without a result.
            Message::SessionComplete(None) => {}
            Message::ExpectedChanged(s) => {
                self.expected = s;
                self.refresh_outcome();
            }
            Message::LoadHashFile => {
                return Task::perform(async {
                    FileDialog::new().set_directory(".").add_filter("checksums", &["txt", "md5", "sha1", "sha256", "sum"]).pick_file()
                }, |res| {
                    if let Some(p) = res {
                        let txt = std::fs::read_to_string(p).ok();
                        Message::HashFileLoaded(txt)
                    } else {
                        Message::HashFileLoaded(None)
                    }
                });
            }
            Message::HashFileLoaded(opt) => {
                if let Some(txt) = opt {
                    match utils::parse_first_hash_from_text(&txt) {
                        Some(h) => {
                            self.expected = h;
                            self.refresh_outcome();
                        }
                        None => self.status_message = "No checksum found in that file".to_string(),
                    }
                }
            }
            Message::ToggleTheme => {
                self.theme = match self.theme {
                    Theme::Light => Theme::Dark,
                    Theme::Dark => Theme::Light,
                };
            }
            Message::Quit => {
                return iced::exit();
            }
        }
        Task::none()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(key::Named::Escape) => Some(Message::Quit),
            _ => None,
        })
    }

    fn start_session(&mut self, path: PathBuf) -> Task<Message> {
        let Some((id, completion)) = self.coordinator.submit(path.clone()) else {
            return Task::none();
        };
        self.status_message = format!("Computing hashes for {}", path.display());
        self.chosen_file = Some(path);
        self.results = None;
        self.pending = Some(id);
        Task::perform(completion, Message::SessionComplete)
    }

    fn refresh_outcome(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let empty = DigestSet::default();
        let results = self.results.as_ref().map(|s| &s.results).unwrap_or(&empty);
        self.outcome = compare::match_expected(&self.expected, results);
        self.status_message = self.outcome.to_string();
    }

    pub fn view(&self) -> Element<'_, Message> {
        let sidebar = self.view_sidebar();
        let main_content = self.view_main();

        let layout = Row::new()
            .push(sidebar)
            .push(rule::Rule::vertical(1))
            .push(main_content);

        let bg_color = self.bg_color();
        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(bg_color)),
                    border: Border::default(),
                    ..Default::default()
                }
            })
            .into()
    }

    fn view_sidebar(&self) -> Element<'_, Message> {
        let accent = self.accent_color();
        let secondary_text = self.secondary_text_color();

        let title = Text::new("VeriFile")
            .size(28)
            .style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(accent),
                }
            });

        let subtitle = Text::new("MD5 · SHA1 · SHA256")
            .size(14)
            .style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(secondary_text),
                }
            });

        let theme_btn = Button::new(
            Text::new(match self.theme {
                Theme::Light => "🌙 Dark Mode",
                Theme::Dark => "☀️ Light Mode",
            })
                .size(14)
        )
        .on_press(Message::ToggleTheme)
        .padding(10)
        .width(Length::Fill);

        let sidebar_content = Column::new()
            .padding(20)
            .spacing(20)
            .width(Length::Fixed(240.0))
            .push(title)
            .push(subtitle)
            .push(Space::with_height(10))
            .push(rule::Rule::horizontal(1))
            .push(Space::with_height(10))
            .push(theme_btn);

        let sidebar_bg = self.sidebar_bg_color();
        Container::new(sidebar_content)
            .height(Length::Fill)
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(sidebar_bg)),
                    border: Border::default(),
                    ..Default::default()
                }
            })
            .into()
    }

    fn view_main(&self) -> Element<'_, Message> {
        let text_color = self.text_color();
        let tertiary_text = self.tertiary_text_color();

        let browse_btn = Button::new(
            Text::new("File...")
                .size(16)
        )
        .on_press(Message::ChooseFile)
        .padding(12)
        .width(Length::Fixed(140.0));

        let file_text = match &self.chosen_file {
            Some(path) => path.display().to_string(),
            None => "No file selected".to_string(),
        };
        let file_color = if self.chosen_file.is_some() { text_color } else { tertiary_text };
        let file_row = Row::new()
            .spacing(15)
            .align_y(alignment::Vertical::Center)
            .push(browse_btn)
            .push(self.boxed(
                Text::new(file_text)
                    .size(14)
                    .style(move |_theme| {
                        iced::widget::text::Style {
                            color: Some(file_color),
                        }
                    })
            ));

        let expected_input = TextInput::new(
            "Paste expected hash here",
            &self.expected,
        )
        .on_input(Message::ExpectedChanged)
        .padding(12)
        .size(14)
        .width(Length::Fill);

        let load_file_btn = Button::new(
            Text::new("📁 Load")
                .size(14)
        )
        .on_press(Message::LoadHashFile)
        .padding(12);

        let expected_row = Row::new()
            .spacing(15)
            .align_y(alignment::Vertical::Center)
            .push(Text::new("Expected").size(16).width(Length::Fixed(140.0)).style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(text_color),
                }
            }))
            .push(expected_input)
            .push(load_file_btn);

        let mut digests = Column::new().spacing(15).width(Length::Fill);
        for algorithm in Algorithm::all() {
            digests = digests.push(self.digest_row(algorithm));
        }

        let status_color = self.status_color();
        let status = Text::new(&self.status_message)
            .size(16)
            .style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(status_color),
                }
            });

        let content = Column::new()
            .padding(40)
            .spacing(25)
            .width(Length::Fill)
            .push(file_row)
            .push(expected_row)
            .push(rule::Rule::horizontal(1))
            .push(digests)
            .push(rule::Rule::horizontal(1))
            .push(status);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn digest_row(&self, algorithm: Algorithm) -> Element<'_, Message> {
        let text_color = self.text_color();
        let tertiary_text = self.tertiary_text_color();
        let highlighted = self.outcome == MatchOutcome::Matches(algorithm);
        let value_color = match self.results.as_ref().and_then(|s| s.results.get(algorithm)) {
            Some(result) if result.error().is_some() => Color::from_rgb(0.9, 0.2, 0.2),
            _ if highlighted => Color::from_rgb(0.2, 0.7, 0.2),
            _ => text_color,
        };
        let value = self
            .results
            .as_ref()
            .and_then(|s| s.results.get(algorithm))
            .map(|r| r.text().to_string())
            .unwrap_or_default();

        let label = Column::new()
            .spacing(4)
            .width(Length::Fixed(140.0))
            .push(Text::new(algorithm.name()).size(16).style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(text_color),
                }
            }))
            .push(Text::new(algorithm.description()).size(10).style(move |_theme| {
                iced::widget::text::Style {
                    color: Some(tertiary_text),
                }
            }));

        Row::new()
            .spacing(15)
            .align_y(alignment::Vertical::Center)
            .push(label)
            .push(self.boxed(
                Text::new(value)
                    .size(14)
                    .style(move |_theme| {
                        iced::widget::text::Style {
                            color: Some(value_color),
                        }
                    })
            ))
            .into()
    }

    fn boxed<'a>(&self, content: Text<'a>) -> Element<'a, Message> {
        let container_bg = self.container_bg_color();
        let border_color = self.border_color();
        Container::new(content)
            .padding(10)
            .width(Length::Fill)
            .style(move |_theme| {
                iced::widget::container::Style {
                    background: Some(iced::Background::Color(container_bg)),
                    border: Border {
                        color: border_color,
                        width: 1.0,
                        radius: 4.0.into(),
                    },
                    ..Default::default()
                }
            })
            .into()
    }

    fn status_color(&self) -> Color {
        match self.outcome {
            _ if self.pending.is_some() => self.secondary_text_color(),
            MatchOutcome::Matches(_) => Color::from_rgb(0.2, 0.7, 0.2),
            MatchOutcome::NoMatch => Color::from_rgb(0.9, 0.2, 0.2),
            MatchOutcome::EmptyExpected => self.secondary_text_color(),
        }
    }

    // Theme color helpers
    fn bg_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(1.0, 1.0, 1.0),
            Theme::Dark => Color::from_rgb(0.11, 0.11, 0.13),
        }
    }

    fn sidebar_bg_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.95, 0.95, 0.97),
            Theme::Dark => Color::from_rgb(0.15, 0.15, 0.17),
        }
    }

    fn text_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.1, 0.1, 0.1),
            Theme::Dark => Color::from_rgb(0.9, 0.9, 0.9),
        }
    }

    fn secondary_text_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.4, 0.4, 0.4),
            Theme::Dark => Color::from_rgb(0.6, 0.6, 0.6),
        }
    }

    fn tertiary_text_color(&self) -> Color {
        Color::from_rgb(0.5, 0.5, 0.5)
    }

    fn container_bg_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.95, 0.95, 0.95),
            Theme::Dark => Color::from_rgb(0.2, 0.2, 0.22),
        }
    }

    fn border_color(&self) -> Color {
        match self.theme {
            Theme::Light => Color::from_rgb(0.8, 0.8, 0.8),
            Theme::Dark => Color::from_rgb(0.3, 0.3, 0.32),
        }
    }

    fn accent_color(&self) -> Color {
        Color::from_rgb(0.2, 0.5, 0.8)
    }
}
