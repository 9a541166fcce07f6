//! Named datasets and group aliases.
//!
//! ## Built-in datasets
//!
//! | Name | Kind | Splits | Format |
//! |------|------|--------|--------|
//! | `snli` | ternary | train, validation, test | JSONL |
//! | `multinli` | ternary | train, validation (matched + mismatched) | JSONL |
//! | `multinli_matched` | ternary | train, validation | JSONL |
//! | `multinli_mismatched` | ternary | train, validation | JSONL |
//! | `glue/rte` | binary | train, validation | TSV |
//! | `glue/qnli` | binary | train, validation | TSV |
//! | `glue/wnli` | binary | train, validation | TSV, integer labels |
//! | `superglue/cb` | ternary | train, validation | JSONL |
//! | `anli/r1`, `anli/r2`, `anli/r3` | ternary | train, validation, test | JSONL |
//! | `scitail` | binary | train, validation, test | JSONL |
//!
//! ## Built-in groups
//!
//! | Alias | Expands to |
//! |-------|------------|
//! | `anli` | `anli/r1`, `anli/r2`, `anli/r3` |
//!
//! Groups reference atomic names only, so expansion is a single lookup and
//! cannot cycle.

use crate::spec::DatasetSpec;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

const SNLI_URL: &str = "https://nlp.stanford.edu/projects/snli/snli_1.0.zip";
const MULTINLI_URL: &str = "https://cims.nyu.edu/~sbowman/multinli/multinli_1.0.zip";
const ANLI_URL: &str = "https://dl.fbaipublicfiles.com/anli/anli_v0.1.zip";

/// Catalog of atomic datasets and group aliases.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    datasets: BTreeMap<String, Arc<DatasetSpec>>,
    groups: BTreeMap<String, Vec<String>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();

        registry.register_dataset(
            "snli",
            DatasetSpec::ternary(SNLI_URL)
                .train("snli_1.0/snli_1.0_train.jsonl")
                .validation("snli_1.0/snli_1.0_dev.jsonl")
                .test("snli_1.0/snli_1.0_test.jsonl")
                .premise_column("sentence1")
                .hypothesis_column("sentence2")
                .label_column("gold_label")
                .build()?,
        )?;

        for (name, validation) in [
            (
                "multinli",
                vec![
                    "multinli_1.0/multinli_1.0_dev_matched.jsonl",
                    "multinli_1.0/multinli_1.0_dev_mismatched.jsonl",
                ],
            ),
            (
                "multinli_matched",
                vec!["multinli_1.0/multinli_1.0_dev_matched.jsonl"],
            ),
            (
                "multinli_mismatched",
                vec!["multinli_1.0/multinli_1.0_dev_mismatched.jsonl"],
            ),
        ] {
            registry.register_dataset(
                name,
                DatasetSpec::ternary(MULTINLI_URL)
                    .train("multinli_1.0/multinli_1.0_train.jsonl")
                    .validation(validation)
                    .premise_column("sentence1")
                    .hypothesis_column("sentence2")
                    .label_column("gold_label")
                    .build()?,
            )?;
        }

        registry.register_dataset(
            "glue/rte",
            DatasetSpec::binary("https://dl.fbaipublicfiles.com/glue/data/RTE.zip")
                .train("RTE/train.tsv")
                .validation("RTE/dev.tsv")
                .premise_column("sentence1")
                .hypothesis_column("sentence2")
                .build()?,
        )?;
        registry.register_dataset(
            "glue/qnli",
            DatasetSpec::binary("https://dl.fbaipublicfiles.com/glue/data/QNLIv2.zip")
                .train("QNLI/train.tsv")
                .validation("QNLI/dev.tsv")
                .premise_column("question")
                .hypothesis_column("sentence")
                .build()?,
        )?;
        registry.register_dataset(
            "glue/wnli",
            DatasetSpec::binary("https://dl.fbaipublicfiles.com/glue/data/WNLI.zip")
                .train("WNLI/train.tsv")
                .validation("WNLI/dev.tsv")
                .premise_column("sentence1")
                .hypothesis_column("sentence2")
                .entailment(1)
                .not_entailment(0)
                .build()?,
        )?;
        registry.register_dataset(
            "superglue/cb",
            DatasetSpec::ternary("https://dl.fbaipublicfiles.com/glue/superglue/data/v2/CB.zip")
                .train("CB/train.jsonl")
                .validation("CB/val.jsonl")
                .build()?,
        )?;

        for round in ["R1", "R2", "R3"] {
            registry.register_dataset(
                format!("anli/{}", round.to_lowercase()),
                DatasetSpec::ternary(ANLI_URL)
                    .train(format!("anli_v0.1/{round}/train.jsonl"))
                    .validation(format!("anli_v0.1/{round}/dev.jsonl"))
                    .test(format!("anli_v0.1/{round}/test.jsonl"))
                    .premise_column("context")
                    .entailment("e")
                    .neutral("n")
                    .contradiction("c")
                    .build()?,
            )?;
        }

        registry.register_dataset(
            "scitail",
            DatasetSpec::binary("https://ai2-public-datasets.s3.amazonaws.com/scitail/SciTailV1.1.zip")
                .train("SciTailV1.1/predictor_format/scitail_1.0_structure_train.jsonl")
                .validation("SciTailV1.1/predictor_format/scitail_1.0_structure_dev.jsonl")
                .test("SciTailV1.1/predictor_format/scitail_1.0_structure_test.jsonl")
                .premise_column("sentence1")
                .hypothesis_column("sentence2")
                .label_column("gold_label")
                .entailment("entails")
                .not_entailment("neutral")
                .build()?,
        )?;

        registry.register_group("anli", ["anli/r1", "anli/r2", "anli/r3"])?;
        Ok(registry)
    }

    /// Register an atomic dataset.
    ///
    /// Fails if `name` is already a dataset or a group.
    pub fn register_dataset(
        &mut self,
        name: impl Into<String>,
        spec: impl Into<Arc<DatasetSpec>>,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::configuration("dataset name is empty"));
        }
        if self.datasets.contains_key(&name) || self.groups.contains_key(&name) {
            return Err(Error::configuration(format!("{name} is already registered")));
        }
        self.datasets.insert(name, spec.into());
        Ok(())
    }

    /// Register a group alias over atomic datasets.
    ///
    /// Members must already be registered atomic datasets; groups of groups
    /// are rejected.
    pub fn register_group<I, S>(&mut self, name: impl Into<String>, members: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.datasets.contains_key(&name) || self.groups.contains_key(&name) {
            return Err(Error::configuration(format!("{name} is already registered")));
        }
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Err(Error::configuration(format!("group {name} has no members")));
        }
        if let Some(bad) = members.iter().find(|m| !self.datasets.contains_key(*m)) {
            return Err(Error::configuration(format!(
                "group {name} references {bad}, which is not an atomic dataset"
            )));
        }
        self.groups.insert(name, members);
        Ok(())
    }

    /// Spec of an atomic dataset.
    pub fn spec(&self, name: &str) -> Result<Arc<DatasetSpec>> {
        self.datasets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unknown_dataset(name))
    }

    /// Whether `name` is an atomic dataset.
    #[must_use]
    pub fn is_dataset(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    /// Whether `name` is a group alias.
    #[must_use]
    pub fn is_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Atomic dataset names, sorted.
    pub fn dataset_names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    /// Group alias names, sorted.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Expand names to atomic datasets, keeping the given order and each
    /// group's member order.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>> {
        let mut resolved = Vec::new();
        for name in names {
            let name = name.as_ref();
            if self.datasets.contains_key(name) {
                resolved.push(name.to_string());
            } else if let Some(members) = self.groups.get(name) {
                resolved.extend(members.iter().cloned());
            } else {
                return Err(Error::unknown_dataset(name));
            }
        }
        Ok(resolved)
    }
}
