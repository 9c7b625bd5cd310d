// src/batch.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::engine::FilingParser;
use crate::filing::SectionMap;
use crate::utils::error::AppError;

/// Files parsed at once when the caller does not choose.
pub const DEFAULT_CONCURRENCY: usize = 4;

pub type BatchResult = (PathBuf, Result<SectionMap, AppError>);

/// Parses files concurrently, at most `concurrency` at a time, each on the
/// blocking pool, and returns the results in input order. A failing file
/// only fails its own entry.
pub async fn parse_files(
    parser: Arc<FilingParser>,
    paths: Vec<PathBuf>,
    concurrency: usize,
) -> Vec<BatchResult> {
    stream::iter(paths.into_iter().map(|path| {
        let parser = Arc::clone(&parser);
        async move {
            let result = parse_one(parser, &path).await;
            if let Err(e) = &result {
                tracing::error!("Failed to parse {}: {}", path.display(), e);
            }
            (path, result)
        }
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await
}

async fn parse_one(parser: Arc<FilingParser>, path: &Path) -> Result<SectionMap, AppError> {
    let bytes = tokio::fs::read(path).await?;
    let label = path.display().to_string();
    tracing::debug!("Read {} bytes from {}", bytes.len(), label);
    let sections = tokio::task::spawn_blocking(move || parser.parse_bytes(&bytes, &label)).await?;
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_files_keeps_order_and_isolates_failures() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.htm");
        let second = dir.path().join("second.htm");
        let missing = dir.path().join("missing.htm");
        std::fs::write(&first, "<p>Item 1. Business</p><p>Alpha</p>").unwrap();
        std::fs::write(&second, "<p>Item 2. Properties</p><p>Beta</p><p>Item 3. Legal</p>").unwrap();

        let parser = Arc::new(FilingParser::new());
        let results = tokio_test::block_on(parse_files(
            parser,
            vec![first.clone(), missing.clone(), second.clone()],
            DEFAULT_CONCURRENCY,
        ));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, first);
        assert_eq!(results[1].0, missing);
        assert_eq!(results[2].0, second);

        let alpha = results[0].1.as_ref().unwrap();
        assert_eq!(alpha.keys().collect::<Vec<_>>(), vec!["Item 1. Business"]);
        assert_eq!(alpha.iter().next().unwrap().source_path, first.display().to_string());

        assert!(matches!(results[1].1, Err(AppError::Io(_))));
        assert_eq!(results[2].1.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_zero_concurrency_still_parses_everything() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (1..=5)
            .map(|n| {
                let path = dir.path().join(format!("f{}.htm", n));
                std::fs::write(&path, format!("<p>Item {}. Heading</p><p>Body</p>", n)).unwrap();
                path
            })
            .collect();

        let results = tokio_test::block_on(parse_files(Arc::new(FilingParser::new()), paths.clone(), 0));
        let keys: Vec<String> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().keys().next().unwrap().to_string())
            .collect();
        assert_eq!(
            keys,
            (1..=5).map(|n| format!("Item {}. Heading", n)).collect::<Vec<_>>()
        );
        assert_eq!(results.iter().map(|(p, _)| p.clone()).collect::<Vec<_>>(), paths);
    }
}
