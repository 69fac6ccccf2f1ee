use std::collections::HashMap;
use std::ops::Index;
use std::path::{Path, PathBuf};

use crate::core::types::Properties;

/// The finest-grained unit: one sequencing run/lane with one or two read files
#[derive(Debug, Clone, PartialEq)]
pub struct ReadGroup {
    /// Unique within the owning library
    pub id: String,

    /// First (or only) read file
    pub r1: PathBuf,

    /// MD5 checksum of `r1`
    pub r1_md5: Option<String>,

    /// Mate file for paired-end data
    pub r2: Option<PathBuf>,

    /// MD5 checksum of `r2`
    pub r2_md5: Option<String>,

    /// Fields outside the fixed schema
    pub additional_properties: Properties,
}

impl ReadGroup {
    pub fn new(id: impl Into<String>, r1: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            r1: r1.into(),
            r1_md5: None,
            r2: None,
            r2_md5: None,
            additional_properties: Properties::new(),
        }
    }

    #[must_use]
    pub fn with_r1_md5(mut self, md5: impl Into<String>) -> Self {
        self.r1_md5 = Some(md5.into());
        self
    }

    #[must_use]
    pub fn with_r2(mut self, r2: impl Into<PathBuf>) -> Self {
        self.r2 = Some(r2.into());
        self
    }

    #[must_use]
    pub fn with_r2_md5(mut self, md5: impl Into<String>) -> Self {
        self.r2_md5 = Some(md5.into());
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.additional_properties = properties;
        self
    }

    /// Read files of this readgroup: R1, then R2 if present
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.r1.as_path()).chain(self.r2.as_deref())
    }
}

/// A sequencing library, owning its readgroups in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    pub id: String,
    pub readgroups: Vec<ReadGroup>,
    pub additional_properties: Properties,
}

impl Library {
    pub fn new(id: impl Into<String>, readgroups: Vec<ReadGroup>) -> Self {
        Self {
            id: id.into(),
            readgroups,
            additional_properties: Properties::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.additional_properties = properties;
        self
    }

    /// Find a readgroup by id
    pub fn readgroup(&self, id: &str) -> Option<&ReadGroup> {
        self.readgroups.iter().find(|rg| rg.id == id)
    }

    pub fn len(&self) -> usize {
        self.readgroups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readgroups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReadGroup> {
        self.readgroups.iter()
    }

    pub(crate) fn append_readgroup(&mut self, readgroup: ReadGroup) {
        self.readgroups.push(readgroup);
    }
}

/// A biological sample, owning its libraries in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub libraries: Vec<Library>,

    /// May hold references to other samples (e.g. `control`), kept as opaque values
    pub additional_properties: Properties,
}

impl Sample {
    pub fn new(id: impl Into<String>, libraries: Vec<Library>) -> Self {
        Self {
            id: id.into(),
            libraries,
            additional_properties: Properties::new(),
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.additional_properties = properties;
        self
    }

    /// Find a library by id
    pub fn library(&self, id: &str) -> Option<&Library> {
        self.libraries.iter().find(|lib| lib.id == id)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Library> {
        self.libraries.iter()
    }

    pub(crate) fn append_library(&mut self, library: Library) {
        self.libraries.push(library);
    }
}

/// Root aggregate: every sample of one samplesheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleGroup {
    pub samples: Vec<Sample>,
}

impl SampleGroup {
    #[must_use]
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Find a sample by id (first match when the document repeats ids)
    pub fn sample(&self, id: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// All readgroups with their owning sample and library, in model order
    pub fn readgroups(&self) -> impl Iterator<Item = (&Sample, &Library, &ReadGroup)> {
        self.samples.iter().flat_map(|sample| {
            sample.libraries.iter().flat_map(move |library| {
                library
                    .readgroups
                    .iter()
                    .map(move |readgroup| (sample, library, readgroup))
            })
        })
    }

    /// Every referenced read file: R1 then R2 per readgroup
    pub fn files(&self) -> Vec<&Path> {
        self.readgroups()
            .flat_map(|(_, _, readgroup)| readgroup.files())
            .collect()
    }

    /// Every referenced read file paired with its checksum, if one was given
    pub fn files_and_md5sums(&self) -> Vec<(&Path, Option<&str>)> {
        let mut pairs = Vec::new();
        for (_, _, readgroup) in self.readgroups() {
            pairs.push((readgroup.r1.as_path(), readgroup.r1_md5.as_deref()));
            if let Some(r2) = &readgroup.r2 {
                pairs.push((r2.as_path(), readgroup.r2_md5.as_deref()));
            }
        }
        pairs
    }

    /// Count of (samples, libraries, readgroups)
    pub fn counts(&self) -> (usize, usize, usize) {
        let libraries = self.samples.iter().map(Sample::len).sum();
        let readgroups = self.readgroups().count();
        (self.samples.len(), libraries, readgroups)
    }

    pub(crate) fn append_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }
}

impl Index<usize> for SampleGroup {
    type Output = Sample;

    fn index(&self, index: usize) -> &Sample {
        &self.samples[index]
    }
}

impl Index<usize> for Sample {
    type Output = Library;

    fn index(&self, index: usize) -> &Library {
        &self.libraries[index]
    }
}

impl Index<usize> for Library {
    type Output = ReadGroup;

    fn index(&self, index: usize) -> &ReadGroup {
        &self.readgroups[index]
    }
}

impl<'a> IntoIterator for &'a SampleGroup {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a Sample {
    type Item = &'a Library;
    type IntoIter = std::slice::Iter<'a, Library>;

    fn into_iter(self) -> Self::IntoIter {
        self.libraries.iter()
    }
}

impl<'a> IntoIterator for &'a Library {
    type Item = &'a ReadGroup;
    type IntoIter = std::slice::Iter<'a, ReadGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.readgroups.iter()
    }
}

/// Build-time index over a growing `SampleGroup`.
///
/// Samples and libraries are found by id in O(1) while the group itself keeps
/// first-seen order. Positions never move because nodes are only appended.
#[derive(Debug, Default)]
pub(crate) struct SampleGroupIndex {
    group: SampleGroup,

    /// Index: sample id -> position in `group.samples`
    sample_to_index: HashMap<String, usize>,

    /// Index: (sample position, library id) -> position in `libraries`
    library_to_index: HashMap<(usize, String), usize>,
}

impl SampleGroupIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Position of the sample with `id`, creating it on first sight.
    /// The flag is true when the sample was created by this call.
    pub(crate) fn sample_entry(&mut self, id: &str) -> (usize, bool) {
        if let Some(&index) = self.sample_to_index.get(id) {
            return (index, false);
        }
        let index = self.group.samples.len();
        self.group.append_sample(Sample::new(id, Vec::new()));
        self.sample_to_index.insert(id.to_string(), index);
        (index, true)
    }

    /// Position of library `id` under the sample at `sample`, creating it on first sight
    pub(crate) fn library_entry(&mut self, sample: usize, id: &str) -> (usize, bool) {
        let key = (sample, id.to_string());
        if let Some(&index) = self.library_to_index.get(&key) {
            return (index, false);
        }
        let owner = &mut self.group.samples[sample];
        let index = owner.libraries.len();
        owner.append_library(Library::new(id, Vec::new()));
        self.library_to_index.insert(key, index);
        (index, true)
    }

    pub(crate) fn sample_mut(&mut self, sample: usize) -> &mut Sample {
        &mut self.group.samples[sample]
    }

    pub(crate) fn library_mut(&mut self, sample: usize, library: usize) -> &mut Library {
        &mut self.group.samples[sample].libraries[library]
    }

    pub(crate) fn finish(self) -> SampleGroup {
        self.group
    }
}
