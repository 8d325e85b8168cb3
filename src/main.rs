mod actions;
mod artwork;
mod color;
mod config;
mod host;
mod logging;
mod pipeline;
mod reconcile;
mod runtime;
mod session;
mod store;
mod widget;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
