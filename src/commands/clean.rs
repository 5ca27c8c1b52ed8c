//! Remove generated output

use anyhow::Result;
use std::fs;

use crate::Site;

pub fn run(site: &Site) -> Result<()> {
    if site.public_dir.exists() {
        fs::remove_dir_all(&site.public_dir)?;
        tracing::info!(dir = %site.public_dir.display(), "removed");
    } else {
        tracing::info!("nothing to clean");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = tempdir().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(public.join("posts")).unwrap();
        fs::write(public.join("index.html"), "x").unwrap();

        let site = Site::new(dir.path()).unwrap();
        run(&site).unwrap();
        assert!(!public.exists());

        // cleaning twice is fine
        run(&site).unwrap();
    }
}
