//! Interactive terminal editor.

mod app;
mod form;
mod input;
mod ui;

pub use app::App;

/// Take over the terminal until the user quits.
pub fn run(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::try_init()?;
    let result = input::run_app(&mut terminal, app);
    ratatui::restore();
    result?;
    Ok(())
}
