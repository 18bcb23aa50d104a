//! Writing generated chains to disk.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use log::{info, warn};
use tempfile::NamedTempFile;

use crate::error::CertError;

const BYTES_PER_LINE: usize = 16;

/// Render `data` as a C byte array named after `path`'s file stem.
#[must_use]
pub fn hex_dump(data: &[u8], path: &Path) -> String {
    let name = array_name(path);
    let mut out = String::new();
    let _ = writeln!(out, "/* {} bytes */", data.len());
    let _ = writeln!(out, "const uint8_t {name}[{}] = {{", data.len());
    for line in data.chunks(BYTES_PER_LINE) {
        let bytes: Vec<String> = line.iter().map(|b| format!("0x{b:02x}")).collect();
        let _ = writeln!(out, "    {},", bytes.join(", "));
    }
    out.push_str("};\n");
    out
}

fn array_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("certificate");
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile, CertError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    Ok(file)
}

/// Write `data` to `bin_path`, and its [`hex_dump`] to `hex_path` if given.
///
/// Every file is staged next to its destination and only renamed into
/// place once all contents are written. The hex dump is persisted before
/// the binary, and removed again if the binary cannot be persisted, so a
/// failure leaves no binary behind.
///
/// # Errors
///
/// Returns [`CertError::Io`] if a file cannot be written.
pub fn write_output(data: &[u8], bin_path: &Path, hex_path: Option<&Path>) -> Result<(), CertError> {
    let bin = stage(bin_path, data)?;
    let hex = hex_path
        .map(|p| stage(p, hex_dump(data, bin_path).as_bytes()).map(|f| (f, p)))
        .transpose()?;

    let written_hex = match hex {
        Some((file, path)) => {
            file.persist(path).map_err(|e| CertError::Io(e.error))?;
            info!("wrote hex dump to {}", path.display());
            Some(path)
        }
        None => None,
    };

    if let Err(e) = bin.persist(bin_path) {
        if let Some(path) = written_hex {
            if let Err(rm) = std::fs::remove_file(path) {
                warn!("cannot remove hex dump {}: {rm}", path.display());
            }
        }
        return Err(CertError::Io(e.error));
    }
    info!("wrote {} bytes to {}", data.len(), bin_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn hex_dump_is_c_array() {
        let data: Vec<u8> = (0..18).collect();
        let text = hex_dump(&data, Path::new("out/dev-cert.bin"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "/* 18 bytes */");
        assert_eq!(lines[1], "const uint8_t dev_cert[18] = {");
        assert!(lines[2].starts_with("    0x00, 0x01,"));
        assert_eq!(lines[2].matches("0x").count(), 16);
        assert_eq!(lines[3], "    0x10, 0x11,");
        assert_eq!(lines[4], "};");
    }

    #[test]
    fn array_name_never_starts_with_digit() {
        assert_eq!(array_name(Path::new("1st.bin")), "_1st");
    }

    #[test]
    fn writes_binary_and_hex() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("cert.bin");
        let hex = dir.path().join("cert.txt");
        write_output(&[1, 2, 3], &bin, Some(&hex)).unwrap();
        assert_eq!(std::fs::read(&bin).unwrap(), [1, 2, 3]);
        assert!(std::fs::read_to_string(&hex).unwrap().contains("0x03"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn failed_hex_staging_leaves_no_binary() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("cert.bin");
        let hex = dir.path().join("missing-dir").join("cert.txt");
        assert!(write_output(&[1, 2, 3], &bin, Some(&hex)).is_err());
        assert!(!bin.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn hex_path_on_directory_leaves_no_binary() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("cert.bin");
        let hex = dir.path().join("cert.txt");
        std::fs::create_dir(&hex).unwrap();
        std::fs::write(hex.join("occupant"), b"x").unwrap();

        assert!(write_output(&[1, 2, 3], &bin, Some(&hex)).is_err());
        assert!(!bin.exists());
        assert!(hex.is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn binary_path_on_directory_removes_written_hex() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("cert.bin");
        let hex = dir.path().join("cert.txt");
        std::fs::create_dir(&bin).unwrap();
        std::fs::write(bin.join("occupant"), b"x").unwrap();

        assert!(write_output(&[1, 2, 3], &bin, Some(&hex)).is_err());
        assert!(!hex.exists());
        assert!(bin.is_dir());
    }
}
