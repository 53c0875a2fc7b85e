//! Stand-in executables for tests that drive external tools

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `sh` script called `name` into `dir`
pub(crate) fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Body of a fake yt-dlp that answers `--dump-single-json` with `info_json`
/// and otherwise runs `download` with `$out` set to the `-o` argument
pub(crate) fn fake_yt_dlp(info_json: &str, download: &str) -> String {
    format!(
        r#"if [ "$1" = "--dump-single-json" ]; then
cat <<'JSON'
{info_json}
JSON
exit 0
fi
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
{download}"#
    )
}
