//! Stage table inspection — `drill list` and `drill export`.

use anyhow::Result;
use console::style;
use std::path::Path;

use drill::stage::{StagesFile, default_stages, load_stages_or_default};

/// Print the stage table, one line per stage.
pub fn cmd_list(stages_path: Option<&Path>) -> Result<()> {
    let stages = load_stages_or_default(stages_path)?;

    println!();
    println!("{}", style("Stage table").bold());
    for (i, stage) in stages.iter().enumerate() {
        let mut flags = Vec::new();
        if stage.requires_confirmation {
            flags.push("gate".to_string());
        }
        if !stage.substeps.is_empty() {
            flags.push(format!("{} substeps", stage.substeps.len()));
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };

        println!(
            "  {} {} [{}] {}ms{}",
            style(format!("{:>2}", i)).dim(),
            stage.title,
            style(stage.view).cyan(),
            stage.delay_ms,
            style(flags).yellow()
        );
        for substep in &stage.substeps {
            println!(
                "       {} {} (+{}ms, {}ms)",
                style("·").dim(),
                substep.title,
                substep.start_delay_ms,
                substep.duration_ms
            );
        }
    }
    println!();
    Ok(())
}

/// Write the built-in stage table as JSON, ready to edit and feed back
/// via `--stages`.
pub fn cmd_export(path: &Path) -> Result<()> {
    let file = StagesFile {
        description: "网络故障恢复演练".to_string(),
        stages: default_stages(),
    };
    file.save(path)?;
    println!("Exported stage table to {}", path.display());
    Ok(())
}
