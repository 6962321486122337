use std::path::Path;

use pomotray_core::Config;

pub fn run(path: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config.tasks)?);
        return Ok(());
    }

    for (index, task) in config.tasks.iter().enumerate() {
        let marker = if task.in_menu { "  [menu]" } else { "" };
        println!("{:>2}. {}{}", index + 1, task, marker);
    }
    Ok(())
}
