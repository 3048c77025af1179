use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{OddsError, Result};
use crate::odds::{EventRow, RowKey};

/// `<data_dir>/<league>.json`
pub fn league_cache_path(data_dir: &Path, league: &str) -> PathBuf {
    data_dir.join(format!("{league}.json"))
}

/// Reads a newline-delimited JSON cache file. `Ok(None)` when the file does
/// not exist.
pub fn read_rows(path: &Path) -> Result<Option<Vec<EventRow>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(OddsError::io(path, err)),
    };
    parse_rows(path, &raw).map(Some)
}

fn parse_rows(path: &Path, raw: &str) -> Result<Vec<EventRow>> {
    let mut rows = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = serde_json::from_str(line).map_err(|source| OddsError::CacheRecord {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Existing rows followed by new rows, with earlier duplicates of a key
/// dropped. Surviving rows keep the position of their last occurrence.
pub fn merge_rows(existing: Vec<EventRow>, new: Vec<EventRow>) -> Vec<EventRow> {
    let combined: Vec<EventRow> = existing.into_iter().chain(new).collect();
    let mut last_seen: HashMap<RowKey, usize> = HashMap::with_capacity(combined.len());
    for (idx, row) in combined.iter().enumerate() {
        last_seen.insert(row.key(), idx);
    }
    combined
        .into_iter()
        .enumerate()
        .filter(|(idx, row)| last_seen.get(&row.key()) == Some(idx))
        .map(|(_, row)| row)
        .collect()
}

/// Overwrites `path` with one JSON record per line.
pub fn write_rows(path: &Path, rows: &[EventRow]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| OddsError::io(dir, e))?;
    }
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row).map_err(OddsError::Serialize)?);
        out.push('\n');
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, out).map_err(|e| OddsError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| OddsError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{league_cache_path, merge_rows, read_rows, write_rows};
    use crate::error::OddsError;
    use crate::odds::{EventId, EventRow};

    fn row(id: &str, home: &str, away: &str, home_odds: f64) -> EventRow {
        EventRow {
            id: EventId::from(id),
            home_team: home.to_string(),
            away_team: away.to_string(),
            bookie_home_odds: home_odds,
            bookie_draw_odds: 3.4,
            bookie_away_odds: 4.1,
        }
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!("soccer_odds_store_{tag}_{}_{nanos}", std::process::id()))
    }

    #[test]
    fn newest_row_wins() {
        let merged = merge_rows(
            vec![row("e1", "A", "B", 2.0), row("e2", "C", "D", 1.8)],
            vec![row("e1", "A", "B", 2.5)],
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, EventId::from("e2"));
        assert_eq!(merged[1].bookie_home_odds, 2.5);
    }

    #[test]
    fn merge_with_self_is_deduplicated() {
        let table = vec![row("e1", "A", "B", 2.0), row("e2", "C", "D", 1.8)];
        let merged = merge_rows(table.clone(), table.clone());
        assert_eq!(merged, table);
    }

    #[test]
    fn same_id_different_teams_are_distinct() {
        let merged = merge_rows(vec![row("e1", "A", "B", 2.0)], vec![row("e1", "A", "C", 2.0)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_existing_keeps_new_table() {
        let new = vec![row("e1", "A", "B", 2.0)];
        assert_eq!(merge_rows(Vec::new(), new.clone()), new);
    }

    #[test]
    fn write_then_read_back() {
        let dir = scratch_dir("rw");
        let path = league_cache_path(&dir, "ENG-Premier League");
        let rows = vec![row("e1", "A", "B", 2.0), row("e2", "C", "D", 1.8)];
        write_rows(&path, &rows).expect("write");

        let raw = fs::read_to_string(&path).expect("file");
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.lines().all(|l| l.starts_with(r#"{"id":"#)));
        assert_eq!(read_rows(&path).expect("read"), Some(rows));
        assert!(!path.with_extension("json.tmp").exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn absent_file_is_none() {
        let dir = scratch_dir("absent");
        assert_eq!(read_rows(&dir.join("missing.json")).expect("read"), None);
    }

    #[test]
    fn malformed_line_reports_position() {
        let dir = scratch_dir("bad");
        fs::create_dir_all(&dir).expect("dir");
        let path = dir.join("bad.json");
        fs::write(
            &path,
            "{\"id\":\"e1\",\"home_team\":\"A\",\"away_team\":\"B\",\"bookie_home_odds\":2.0,\"bookie_draw_odds\":3.0,\"bookie_away_odds\":4.0}\n\nnot json\n",
        )
        .expect("write");
        let err = read_rows(&path).unwrap_err();
        assert!(matches!(err, OddsError::CacheRecord { line: 3, .. }));
        let _ = fs::remove_dir_all(dir);
    }
}
