use rand::{seq::SliceRandom, Rng};
use std::{collections::HashMap, fs, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

/// Immutable movie catalog with its precomputed similarity matrix
///
/// Scores are stored row-major in one contiguous buffer: the similarity of
/// movie `i` to movie `j` lives at `i * size + j`.
#[derive(Debug)]
pub struct Catalog {
    movies: Vec<Movie>,
    scores: Vec<f32>,
    by_title: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, validating that `scores` is a finite `n x n` matrix
    pub fn new(movies: Vec<Movie>, scores: Vec<f32>) -> AppResult<Self> {
        let size = movies.len();
        let expected = size.checked_mul(size).ok_or_else(|| {
            AppError::Catalog(format!("Catalog of {} movies is too large", size))
        })?;

        if scores.len() != expected {
            return Err(AppError::Catalog(format!(
                "Similarity matrix has {} scores, expected {} for {} movies",
                scores.len(),
                expected,
                size
            )));
        }

        if let Some(position) = scores.iter().position(|s| !s.is_finite()) {
            return Err(AppError::Catalog(format!(
                "Similarity score at row {}, column {} is not finite",
                position / size,
                position % size
            )));
        }

        // First occurrence wins for duplicate titles
        let mut by_title = HashMap::with_capacity(size);
        for (index, movie) in movies.iter().enumerate() {
            by_title.entry(movie.title.clone()).or_insert(index);
        }

        Ok(Self {
            movies,
            scores,
            by_title,
        })
    }

    /// Loads the catalog from its two static JSON artifacts
    ///
    /// `movies_path` holds `[{"id": .., "title": ..}, ...]`; `similarity_path`
    /// holds one array of scores per movie, in the same order.
    pub fn load(
        movies_path: impl AsRef<Path>,
        similarity_path: impl AsRef<Path>,
    ) -> AppResult<Self> {
        let movies: Vec<Movie> = read_json(movies_path.as_ref())?;
        let rows: Vec<Vec<f32>> = read_json(similarity_path.as_ref())?;

        let size = movies.len();
        if rows.len() != size {
            return Err(AppError::Catalog(format!(
                "Similarity matrix has {} rows, expected {}",
                rows.len(),
                size
            )));
        }

        let mut scores = Vec::with_capacity(size * size);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(AppError::Catalog(format!(
                    "Similarity row {} has {} scores, expected {}",
                    index,
                    row.len(),
                    size
                )));
            }
            scores.extend(row);
        }

        let catalog = Self::new(movies, scores)?;

        tracing::info!(movies = catalog.size(), "Catalog loaded");

        Ok(catalog)
    }

    /// Returns the position of the first movie titled exactly `title`
    pub fn resolve(&self, title: &str) -> AppResult<usize> {
        self.by_title
            .get(title)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("Movie '{}' is not in the catalog", title)))
    }

    pub fn item_at(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    pub fn size(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Similarity of movie `index` to every catalog movie, in catalog order
    pub fn similarity_row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.size() {
            return None;
        }
        let start = index * self.size();
        Some(&self.scores[start..start + self.size()])
    }

    /// Catalog titles in catalog order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|m| m.title.as_str())
    }

    /// Up to `count` distinct movies chosen at random
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&Movie> {
        self.movies.choose_multiple(rng, count).collect()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AppResult<T> {
    let contents = fs::read_to_string(path).map_err(|e| {
        AppError::Catalog(format!("Failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&contents)
        .map_err(|e| AppError::Catalog(format!("Failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Write;

    fn abc_catalog() -> Catalog {
        Catalog::new(
            vec![Movie::new(1, "A"), Movie::new(2, "B"), Movie::new(3, "C")],
            vec![
                1.0, 0.9, 0.1, //
                0.9, 1.0, 0.2, //
                0.1, 0.2, 1.0,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_known_title() {
        let catalog = abc_catalog();
        assert_eq!(catalog.resolve("B").unwrap(), 1);
        assert_eq!(catalog.item_at(1), Some(&Movie::new(2, "B")));
        assert_eq!(catalog.size(), 3);
    }

    #[test]
    fn test_resolve_is_exact_match() {
        let catalog = abc_catalog();
        assert!(matches!(catalog.resolve("a"), Err(AppError::NotFound(_))));
        assert!(matches!(catalog.resolve(" A"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_resolve_duplicate_title_returns_first() {
        let catalog = Catalog::new(
            vec![Movie::new(10, "Heat"), Movie::new(11, "Heat")],
            vec![1.0, 0.5, 0.5, 1.0],
        )
        .unwrap();
        assert_eq!(catalog.resolve("Heat").unwrap(), 0);
    }

    #[test]
    fn test_empty_catalog_never_resolves() {
        let catalog = Catalog::new(vec![], vec![]).unwrap();
        assert!(catalog.is_empty());
        assert!(matches!(catalog.resolve("A"), Err(AppError::NotFound(_))));
        assert_eq!(catalog.similarity_row(0), None);
    }

    #[test]
    fn test_similarity_row() {
        let catalog = abc_catalog();
        assert_eq!(catalog.similarity_row(0), Some(&[1.0, 0.9, 0.1][..]));
        assert_eq!(catalog.similarity_row(2), Some(&[0.1, 0.2, 1.0][..]));
        assert_eq!(catalog.similarity_row(3), None);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let result = Catalog::new(vec![Movie::new(1, "A"), Movie::new(2, "B")], vec![1.0, 0.5]);
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let result = Catalog::new(vec![Movie::new(1, "A")], vec![f32::NAN]);
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }

    #[test]
    fn test_titles_in_catalog_order() {
        let catalog = abc_catalog();
        assert_eq!(catalog.titles().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_sample_is_distinct_and_bounded() {
        let catalog = abc_catalog();
        let mut rng = StdRng::seed_from_u64(7);

        let two = catalog.sample(2, &mut rng);
        assert_eq!(two.len(), 2);
        assert_ne!(two[0].id, two[1].id);

        let all = catalog.sample(10, &mut rng);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_load_from_files() {
        let mut movies = tempfile::NamedTempFile::new().unwrap();
        write!(movies, r#"[{{"id": 1, "title": "A"}}, {{"id": 2, "title": "B"}}]"#).unwrap();
        let mut similarity = tempfile::NamedTempFile::new().unwrap();
        write!(similarity, "[[1.0, 0.3], [0.3, 1.0]]").unwrap();

        let catalog = Catalog::load(movies.path(), similarity.path()).unwrap();
        assert_eq!(catalog.size(), 2);
        assert_eq!(catalog.similarity_row(1), Some(&[0.3, 1.0][..]));
    }

    #[test]
    fn test_load_rejects_ragged_rows() {
        let mut movies = tempfile::NamedTempFile::new().unwrap();
        write!(movies, r#"[{{"id": 1, "title": "A"}}, {{"id": 2, "title": "B"}}]"#).unwrap();
        let mut similarity = tempfile::NamedTempFile::new().unwrap();
        write!(similarity, "[[1.0, 0.3], [0.3]]").unwrap();

        let result = Catalog::load(movies.path(), similarity.path());
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }

    #[test]
    fn test_bundled_demo_catalog_loads() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let catalog = Catalog::load(
            root.join("data/movies.json"),
            root.join("data/similarity.json"),
        )
        .unwrap();
        assert_eq!(catalog.resolve("Inception").unwrap(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Catalog::load("/nonexistent/movies.json", "/nonexistent/similarity.json");
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }
}
