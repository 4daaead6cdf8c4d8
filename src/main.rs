use anyhow::Result;

fn main() -> Result<()> {
    notes_pipeline::cli::run()
}
