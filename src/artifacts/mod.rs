//! Artifact persistence for pipeline auditing.
//!
//! Every stage of the pipeline can persist its output under an image's
//! base name: stage masks as PNG, structured results as JSON, and a
//! human-readable text rendering wherever a person is expected to diff
//! runs. All files share the `<base>__<suffix>` naming scheme so one
//! directory can hold a whole batch.
//!
//! The store is optional everywhere; the pipeline computes identical
//! results without one.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::expr::ConvertedExpression;
use crate::extract::{Block, VerticalRail};
use crate::grouping::{PassDebug, PassSnapshot};
use crate::raster::BinaryMask;

/// Writes pipeline artifacts into one output directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open a store rooted at `dir`, creating it if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir: dir.as_ref().to_path_buf() })
    }

    /// Output directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, base: &str, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}__{}", base, suffix))
    }

    fn write_json<T: Serialize>(&self, base: &str, suffix: &str, value: &T) -> Result<()> {
        let path = self.path(base, suffix);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    fn write_text(&self, base: &str, suffix: &str, text: &str) -> Result<()> {
        let path = self.path(base, suffix);
        fs::write(&path, text)?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    /// Persist a stage mask as `<base>__<stage>.png`.
    pub fn save_mask(&self, base: &str, stage: &str, mask: &BinaryMask) -> Result<()> {
        mask.save(self.path(base, &format!("{}.png", stage)))
    }

    /// Persist the vertical rails as `<base>__verticals.json`.
    pub fn save_verticals(&self, base: &str, rails: &[VerticalRail]) -> Result<()> {
        self.write_json(base, "verticals.json", &json!({ "verticals": rails }))
    }

    /// Persist synthesized blocks as `<base>__blocks.json`.
    pub fn save_blocks(&self, base: &str, blocks: &[Block]) -> Result<()> {
        self.write_json(base, "blocks.json", &blocks)
    }

    /// Persist the association result as JSON plus a text rendering.
    pub fn save_tagged_blocks(&self, base: &str, blocks: &[Block]) -> Result<()> {
        self.write_json(
            base,
            "tagged_blocks.json",
            &json!({ "image_base": base, "groups": blocks }),
        )?;
        self.write_text(base, "tagged_blocks.txt", &render_blocks(base, blocks))
    }

    /// Persist one grouping pass as JSON plus a text rendering.
    pub fn save_snapshot(&self, base: &str, snapshot: &PassSnapshot) -> Result<()> {
        let stem = snapshot.stem();
        self.write_json(base, &format!("{}.json", stem), snapshot)?;
        self.write_text(
            base,
            &format!("{}_readable.txt", stem),
            &render_snapshot(base, snapshot),
        )
    }

    /// Persist the final block list as JSON plus a text rendering.
    pub fn save_final(&self, base: &str, blocks: &[Block]) -> Result<()> {
        self.write_json(
            base,
            "final.json",
            &json!({ "image_base": base, "final_blocks": blocks }),
        )?;
        self.write_text(base, "final_readable.txt", &render_blocks(base, blocks))
    }

    /// Persist converted expressions as `<base>__converted.json`.
    pub fn save_converted(&self, base: &str, converted: &[ConvertedExpression]) -> Result<()> {
        self.write_json(base, "converted.json", &converted)
    }
}

fn render_blocks(base: &str, blocks: &[Block]) -> String {
    let mut out = format!("{}: {} block(s)\n", base, blocks.len());
    for (i, b) in blocks.iter().enumerate() {
        let _ = writeln!(
            out,
            "[{:02}] rect=({}, {}, {}, {}) cy={:.1} bus={}",
            i + 1,
            b.rect.x1,
            b.rect.y1,
            b.rect.x2,
            b.rect.y2,
            b.cy,
            b.touches_right_bus,
        );
        if !b.tags.is_empty() {
            let texts: Vec<&str> = b.tags.iter().map(|t| t.text.as_str()).collect();
            let _ = writeln!(out, "     tags: {}", texts.join(", "));
        }
        let _ = writeln!(out, "     expr: {}", b.expression_string());
    }
    out
}

fn render_snapshot(base: &str, snapshot: &PassSnapshot) -> String {
    let mut out = format!(
        "{}: iteration {}, {} pass, subpass {}\n\n",
        base, snapshot.iteration, snapshot.phase, snapshot.subpass
    );
    out.push_str(&render_blocks(base, &snapshot.blocks));
    match &snapshot.debug {
        PassDebug::Or(groups) => {
            let _ = writeln!(out, "\n{} merge(s)", groups.len());
            for g in groups {
                let members: Vec<String> = g
                    .members
                    .iter()
                    .map(|m| format!("({}, {}) '{}'", m.rect.x1, m.rect.y1, m.expr))
                    .collect();
                let _ = writeln!(out, "  OR [{}] -> '{}'", members.join("; "), g.or_expression);
            }
        },
        PassDebug::And(pairs) => {
            let _ = writeln!(out, "\n{} pair(s)", pairs.len());
            for p in pairs {
                let _ = writeln!(
                    out,
                    "  AND '{}' + '{}' (d={:.1}) -> '{}'",
                    p.a.expr, p.b.expr, p.distance, p.and_expression
                );
            }
        },
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprNode;
    use crate::geometry::PixelRect;
    use crate::grouping::Phase;

    fn block(expr: &str) -> Block {
        let mut b = Block::new(PixelRect::new(10, 20, 110, 70));
        b.expression = Some(crate::expr::parse(expr).unwrap());
        b
    }

    #[test]
    fn test_naming_scheme() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        store.save_verticals("net01", &[]).unwrap();
        assert!(tmp.path().join("net01__verticals.json").exists());
    }

    #[test]
    fn test_verticals_wrapper_object() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        let rails = vec![VerticalRail { id: 0, x: 40, y1: 10, y2: 200 }];
        store.save_verticals("net01", &rails).unwrap();
        let raw = std::fs::read_to_string(tmp.path().join("net01__verticals.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["verticals"][0]["x"], 40);
    }

    #[test]
    fn test_final_artifact_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        store.save_final("net01", &[block("%I0.0")]).unwrap();
        let raw = std::fs::read_to_string(tmp.path().join("net01__final.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["image_base"], "net01");
        assert_eq!(v["final_blocks"][0]["expression"], "%I0.0");
        let txt =
            std::fs::read_to_string(tmp.path().join("net01__final_readable.txt")).unwrap();
        assert!(txt.contains("expr: %I0.0"));
    }

    #[test]
    fn test_snapshot_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        let snapshot = PassSnapshot {
            iteration: 2,
            phase: Phase::Or,
            subpass: 1,
            blocks: vec![block("OR(%I0.0, %I0.1)")],
            debug: crate::grouping::PassDebug::Or(Vec::new()),
        };
        store.save_snapshot("net01", &snapshot).unwrap();
        assert!(tmp.path().join("net01__iter0002_01_OR.json").exists());
        assert!(tmp.path().join("net01__iter0002_01_OR_readable.txt").exists());
    }

    #[test]
    fn test_mask_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        let mut mask = BinaryMask::new(8, 8);
        mask.set(3, 3, true);
        store.save_mask("net01", "binary", &mask).unwrap();
        let path = tmp.path().join("net01__binary.png");
        assert!(path.exists());
        let back = BinaryMask::load(&path).unwrap();
        assert_eq!(back, mask);
    }

    #[test]
    fn test_converted_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        let converted = vec![ConvertedExpression::from_node(&ExprNode::var("%I0.0"))];
        store.save_converted("net01", &converted).unwrap();
        let raw = std::fs::read_to_string(tmp.path().join("net01__converted.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v[0]["python_expression"], "I0_0");
    }
}
