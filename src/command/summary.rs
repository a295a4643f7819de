use anyhow::Result;

use wsroots::workspace::{Manager, VcsDetector, VcsKind};

pub async fn run_summary(manager: &Manager, detector: &VcsDetector, status: bool) -> Result<()> {
    println!("{}", manager.summary());

    if !status {
        return Ok(());
    }

    println!();
    let primary = manager.primary_index();
    for (i, root) in manager.roots().iter().enumerate() {
        let marker = if i == primary { "*" } else { " " };
        println!("{} {:<16} {}", marker, root.name, root.path.display());

        if root.vcs == VcsKind::None {
            println!("    vcs: none");
            continue;
        }

        let branch = match root.vcs {
            VcsKind::Git => detector.branch(&root.path).await.ok(),
            _ => None,
        };
        let clean = match detector.is_clean(&root.path, root.vcs).await {
            Ok(true) => "clean",
            Ok(false) => "modified",
            Err(_) => "unknown",
        };
        println!(
            "    vcs: {}  branch: {}  status: {}",
            root.vcs,
            branch.as_deref().unwrap_or("-"),
            clean
        );
        if let Some(hash) = &root.commit_hash {
            println!("    commit: {}", hash);
        }
        for url in &root.remote_urls {
            println!("    remote: {}", url);
        }
    }

    Ok(())
}

pub fn run_context(manager: &Manager) -> Result<()> {
    let context = manager.build_environment_context()?;
    if context.is_empty() {
        eprintln!("No workspace roots configured.");
    } else {
        println!("{}", context);
    }
    Ok(())
}

pub fn run_state(manager: &Manager) -> Result<()> {
    println!("{}", manager.to_json()?);
    Ok(())
}
