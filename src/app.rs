use anyhow::Result;
use eframe::egui;
use egui_commonmark::CommonMarkCache;

use crate::config::Config;
use crate::fetch::{FetchController, HttpFetcher, RetryPolicy, Settlement};
use crate::picture::Picture;
use crate::ui::{self, Theme};

/// Main application state
pub struct PotdApp {
    /// Application configuration
    pub config: Config,
    /// Fetch lifecycle for the picture
    pub picture: FetchController<Picture>,
    /// When to stop offering retries
    pub retry_policy: RetryPolicy,
    /// Status message for the status bar
    pub status_message: String,
    /// Cache for markdown rendering
    pub markdown_cache: CommonMarkCache,
    /// Current theme
    pub theme: Theme,
    /// Whether theme needs to be applied
    theme_dirty: bool,
}

impl PotdApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let retry_policy = config.fetch.retry_policy();
        let theme = Theme::for_preference(config.appearance.dark_theme);

        Ok(Self {
            config,
            picture: FetchController::new(fetcher),
            retry_policy,
            status_message: "Ready".to_string(),
            markdown_cache: CommonMarkCache::default(),
            theme,
            theme_dirty: true, // Apply theme on first frame
        })
    }

    /// Request the configured picture
    pub fn show_picture(&mut self) {
        let url = self.config.source.url.clone();
        self.picture.fetch_lazy(url);
        self.status_message = "Fetching picture...".to_string();
    }

    /// Fetch the armed picture again
    pub fn reload(&mut self) {
        tracing::debug!("Reload requested for {:?}", self.picture.target());
        self.picture.reload();
        self.status_message = "Reloading...".to_string();
    }

    /// Toggle between night and day themes and persist the choice
    pub fn toggle_theme(&mut self) {
        self.config.appearance.dark_theme = !self.config.appearance.dark_theme;
        self.theme = Theme::for_preference(self.config.appearance.dark_theme);
        self.theme_dirty = true;
        if let Err(e) = self.config.save() {
            tracing::error!("Failed to save config: {}", e);
        }
    }

    /// Fold finished requests into state and update the status bar
    fn poll_picture(&mut self, ctx: &egui::Context) {
        match self.picture.poll() {
            Some(Settlement::Succeeded) => {
                if let Some(picture) = self.picture.data() {
                    tracing::info!("Loaded picture \"{}\" ({})", picture.title, picture.date);
                    self.status_message = format!("Loaded \"{}\"", picture.title);
                }
            }
            Some(Settlement::Failed {
                error_count,
                message,
            }) => {
                tracing::error!("Failed to fetch picture (attempt {}): {}", error_count, message);
                self.status_message = format!("Error: {}", message);
            }
            Some(Settlement::Cancelled) => {
                self.status_message = "Request cancelled".to_string();
            }
            None => {}
        }

        // Keep frames coming so the result is picked up promptly
        if self.picture.is_loading() {
            ctx.request_repaint();
        }
    }
}

impl eframe::App for PotdApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.theme_dirty {
            self.theme.apply(ctx);
            self.theme_dirty = false;
        }

        self.poll_picture(ctx);

        // Status bar at bottom
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.status_message).color(self.theme.text_muted));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = if self.config.appearance.dark_theme { "Day" } else { "Night" };
                    if ui.small_button(label).clicked() {
                        self.toggle_theme();
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::render_picture_view(self, ui);
        });
    }
}
