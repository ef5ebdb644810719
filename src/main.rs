use epss_cache::application::Application;

use std::process;

fn main() {
    let mut application = Application::new();
    application.read_argv();

    // Printed regardless of the log level
    if let Err(e) = application.run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}
