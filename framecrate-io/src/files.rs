//! Per-frame file discovery
//!
//! Frame files are conventionally numbered without zero padding
//! (`000.pcd`, `1.pcd`, `10.pcd`, `2.pcd`), so listings are sorted with a
//! natural comparison that orders digit runs by value.

use framecrate_core::{Error, Result};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// List the files in `dir` whose extension is one of `extensions`
/// (case-insensitive), in natural order.
pub fn list_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::InvalidData(format!("{} is not a directory", dir.display())));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    Ok(files)
}

/// Compare two strings, treating runs of ASCII digits as numbers
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let (na, rest_a) = split_digits(a);
                let (nb, rest_b) = split_digits(b);
                let ord = compare_digit_runs(na, nb);
                if ord != Ordering::Equal {
                    return ord;
                }
                a = rest_a;
                b = rest_b;
            }
            (Some(ca), Some(cb)) => {
                let ord = ca.cmp(&cb);
                if ord != Ordering::Equal {
                    return ord;
                }
                a = &a[ca.len_utf8()..];
                b = &b[cb.len_utf8()..];
            }
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

// Arbitrary-length runs: compare by significant digits, then by padding.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let ta = a.trim_start_matches('0');
    let tb = b.trim_start_matches('0');
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_natural_order() {
        let mut names = vec!["frame10.pcd", "frame2.pcd", "frame1.pcd", "frame02.pcd", "a.pcd"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["a.pcd", "frame1.pcd", "frame2.pcd", "frame02.pcd", "frame10.pcd"]);
    }

    #[test]
    fn test_natural_order_long_numbers() {
        assert_eq!(natural_cmp("1616000000000123", "999"), Ordering::Greater);
        assert_eq!(natural_cmp("img_9_b", "img_9_a"), Ordering::Greater);
        assert_eq!(natural_cmp("x", "x"), Ordering::Equal);
    }

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = std::env::temp_dir().join("framecrate_list_files_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        for name in ["10.jpg", "2.JPG", "1.jpg", "notes.txt"] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let files = list_files(&dir, &["jpg"]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["1.jpg", "2.JPG", "10.jpg"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_list_files_missing_dir() {
        assert!(list_files("/definitely/not/here", &["pcd"]).is_err());
    }
}
