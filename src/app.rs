use gtk4::prelude::*;
use gtk4::Application;

use crate::config::Config;
use crate::ui::MainWindow;

const APP_ID: &str = "com.feedgrid.ImageFeed";

pub struct FeedgridApp {
    app: Application,
}

impl FeedgridApp {
    pub fn new(config: Config) -> Self {
        let app = Application::builder().application_id(APP_ID).build();

        app.connect_activate(move |app| Self::on_activate(app, &config));

        Self { app }
    }

    pub fn run(&self) -> i32 {
        self.app.run().into()
    }

    fn on_activate(app: &Application, config: &Config) {
        match MainWindow::new(app, config) {
            Ok(window) => {
                window.present();
                // Keep the window alive by storing it on the Application.
                unsafe {
                    app.set_data("main-window", window);
                }
            }
            Err(err) => {
                tracing::error!(error = ?err, "Failed to build the main window");
                app.quit();
            }
        }
    }
}
