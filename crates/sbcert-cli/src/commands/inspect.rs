//! `sbcert inspect`: print the layout of a generated chain.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use sbcert_core::{inspect_chain, ChainLayout};

/// Render `layout` one line per envelope or certificate.
#[must_use]
pub fn describe(layout: &ChainLayout) -> String {
    let mut out = String::new();
    if let Some((magic, total)) = layout.envelope {
        let _ = writeln!(out, "envelope magic={magic:#010x} length={total}");
    }
    for entry in &layout.certificates {
        let header = entry.header;
        let (major, minor) = header.version();
        let kind = header
            .kind()
            .map_or_else(|| "unknown".to_owned(), |k| k.to_string());
        let _ = writeln!(
            out,
            "{:>6}: {kind} v{major}.{minor} signed={} flags={:#06x} size={}",
            entry.offset,
            header.signed_content_len(),
            header.flags(),
            entry.len()
        );
        let _ = writeln!(out, "        key  sha256={}", hex::encode(entry.public_key_hash));
        if let Some(next) = entry.next_pubkey_hash {
            let _ = writeln!(out, "        next sha256={}", hex::encode(next));
        }
    }
    for i in layout.broken_links() {
        let _ = writeln!(
            out,
            "warning: certificate {i} does not attest the key of certificate {}",
            i + 1
        );
    }
    out
}

/// Print the structure of the chain stored at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a well-formed chain.
pub fn run_inspect(path: &Path) -> Result<()> {
    let blob = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let layout =
        inspect_chain(&blob).with_context(|| format!("inspecting {}", path.display()))?;
    print!("{}", describe(&layout));
    Ok(())
}
