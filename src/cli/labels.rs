use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;

#[derive(Subcommand, Debug)]
pub enum LabelsCommand {
    #[command(about = "Give a face a new label")]
    Set {
        #[arg(help = "Face code, 1 to 8")]
        code: i64,
        #[arg(help = "New label")]
        name: String,
        #[arg(long, short, help = "Colour as #RRGGBB. The current colour is kept by default")]
        color: Option<String>,
    },
}

/// Without a subcommand lists all faces.
pub async fn process_labels_command(command: Option<LabelsCommand>, dir: &Path) -> Result<()> {
    let mut context = AppContext::open(dir).await;
    if let Some(LabelsCommand::Set { code, name, color }) = command {
        context.set_label(code, &name, color.as_deref()).await?;
    }

    for (face, label) in context.labels().iter() {
        println!("{face}\t{}\t{}", label.name, label.color);
    }
    Ok(())
}
