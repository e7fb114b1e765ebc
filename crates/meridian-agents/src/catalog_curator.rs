//! Built-in dataset curator
//!
//! Scores a fixed catalog of public datasets against the hypothesis text by
//! keyword overlap and returns the top matches. A production deployment
//! would swap this for repository API integrations (Kaggle, UCI ML,
//! data.gov) behind the same `Curator` trait.

use crate::traits::Curator;
use async_trait::async_trait;
use meridian_core::{AccessLevel, Dataset, DatasetSearch, Result};

/// Keywords shorter than this are ignored when scoring relevance
const MIN_KEYWORD_LEN: usize = 4;

/// Curator backed by a static catalog with keyword relevance scoring
pub struct CatalogCurator {
    catalog: Vec<Dataset>,
}

impl CatalogCurator {
    pub fn new(catalog: Vec<Dataset>) -> Self {
        Self { catalog }
    }

    /// The known data-source names represented in the catalog
    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.catalog.iter().map(|d| d.source.clone()).collect();
        sources.dedup();
        sources
    }
}

impl Default for CatalogCurator {
    fn default() -> Self {
        Self::new(builtin_catalog())
    }
}

#[async_trait]
impl Curator for CatalogCurator {
    async fn find_datasets(
        &self,
        hypothesis: &str,
        field: &str,
        max_results: usize,
    ) -> Result<DatasetSearch> {
        tracing::info!(
            "Searching {} catalog datasets (field: {}, max: {})",
            self.catalog.len(),
            field,
            max_results
        );

        let mut scored: Vec<Dataset> = self
            .catalog
            .iter()
            .map(|dataset| {
                let mut d = dataset.clone();
                d.relevance_score = relevance(dataset, hypothesis, field);
                d
            })
            .collect();

        // Highest relevance first; zero-relevance entries are dropped
        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let datasets: Vec<Dataset> = scored
            .into_iter()
            .take(max_results)
            .filter(|d| d.relevance_score > 0.0)
            .collect();

        let total_found = datasets.len();
        tracing::info!("Found {} relevant datasets", total_found);

        Ok(DatasetSearch {
            datasets,
            total_found,
        })
    }
}

/// Keyword-overlap relevance on a 0-10 scale
///
/// Each hypothesis/field token longer than 3 chars that appears in the
/// dataset's name, description, or source scores one point; points are
/// doubled and capped at 10.
fn relevance(dataset: &Dataset, hypothesis: &str, field: &str) -> f64 {
    let text = format!(
        "{} {} {}",
        dataset.name, dataset.description, dataset.source
    )
    .to_lowercase();

    let query = format!("{} {}", hypothesis, field).to_lowercase();
    let score: usize = query
        .split_whitespace()
        .filter(|keyword| keyword.len() >= MIN_KEYWORD_LEN && text.contains(*keyword))
        .count();

    (score as f64 * 2.0).min(10.0)
}

/// The built-in catalog of public aging/longevity datasets
pub fn builtin_catalog() -> Vec<Dataset> {
    vec![
        Dataset {
            name: "Human Aging Longitudinal Study".to_string(),
            source: "UCSD Aging Center".to_string(),
            url: "https://example.com/aging-data".to_string(),
            description:
                "Longitudinal data on aging biomarkers from 10,000 participants over 20 years"
                    .to_string(),
            size: "2.5 GB".to_string(),
            format: "CSV, JSON".to_string(),
            relevance_score: 0.0,
            access: AccessLevel::Public,
        },
        Dataset {
            name: "Cellular Senescence Gene Expression".to_string(),
            source: "GEO Database".to_string(),
            url: "https://example.com/senescence-genes".to_string(),
            description:
                "RNA-seq data of senescent vs non-senescent cells across multiple cell types"
                    .to_string(),
            size: "850 MB".to_string(),
            format: "GEO, CSV".to_string(),
            relevance_score: 0.0,
            access: AccessLevel::Public,
        },
        Dataset {
            name: "Longevity Gene Association Study".to_string(),
            source: "NIH GenBank".to_string(),
            url: "https://example.com/longevity-gwas".to_string(),
            description: "GWAS data associating genetic variants with exceptional longevity"
                .to_string(),
            size: "1.2 GB".to_string(),
            format: "VCF, PLINK".to_string(),
            relevance_score: 0.0,
            access: AccessLevel::Public,
        },
        Dataset {
            name: "Metabolic Aging Markers".to_string(),
            source: "Metabolomics Workbench".to_string(),
            url: "https://example.com/metabolic-aging".to_string(),
            description: "Mass spectrometry data of age-related metabolic changes".to_string(),
            size: "450 MB".to_string(),
            format: "mzML, CSV".to_string(),
            relevance_score: 0.0,
            access: AccessLevel::Public,
        },
        Dataset {
            name: "NAD+ Metabolism Dataset".to_string(),
            source: "Human Metabolome Database".to_string(),
            url: "https://example.com/nad-metabolism".to_string(),
            description: "Comprehensive NAD+ metabolite measurements across age groups"
                .to_string(),
            size: "120 MB".to_string(),
            format: "CSV, XML".to_string(),
            relevance_score: 0.0,
            access: AccessLevel::Public,
        },
        Dataset {
            name: "Autophagy Pathway Analysis".to_string(),
            source: "KEGG Database".to_string(),
            url: "https://example.com/autophagy-pathways".to_string(),
            description: "Pathway analysis data for autophagy-related genes and proteins"
                .to_string(),
            size: "200 MB".to_string(),
            format: "KGML, JSON".to_string(),
            relevance_score: 0.0,
            access: AccessLevel::Public,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relevant_keywords_rank_first() {
        let curator = CatalogCurator::default();
        let result = curator
            .find_datasets("NAD+ metabolism decline drives aging", "longevity", 3)
            .await
            .unwrap();

        assert!(result.total_found > 0);
        assert!(result.total_found <= 3);
        assert_eq!(result.datasets[0].name, "NAD+ Metabolism Dataset");
        // Sorted descending by relevance
        for pair in result.datasets.windows(2) {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
    }

    #[tokio::test]
    async fn test_no_matches_yields_empty() {
        let curator = CatalogCurator::default();
        let result = curator
            .find_datasets("quantum entanglement teleportation", "physics", 3)
            .await
            .unwrap();

        assert_eq!(result.total_found, 0);
        assert!(result.datasets.is_empty());
    }

    #[tokio::test]
    async fn test_max_results_respected() {
        let curator = CatalogCurator::default();
        let result = curator
            .find_datasets("aging longevity senescence metabolic data", "aging", 2)
            .await
            .unwrap();

        assert!(result.datasets.len() <= 2);
    }

    #[test]
    fn test_short_keywords_ignored() {
        let dataset = &builtin_catalog()[0];
        // "of on in to" are all under the length floor
        assert_eq!(relevance(dataset, "of on in to", "a"), 0.0);
    }

    #[test]
    fn test_relevance_capped_at_ten() {
        let dataset = &builtin_catalog()[0];
        let query = "aging biomarkers longitudinal participants years data human study aging";
        assert!(relevance(dataset, query, "aging") <= 10.0);
    }
}
