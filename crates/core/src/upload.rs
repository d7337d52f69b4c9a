//! The batch of documents selected for a merge job.

/// One named file entry, as carried in a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Ordered collection of documents to merge.
///
/// Mutable while the user is still picking files; a submission snapshots
/// the current contents and the batch itself is no longer consulted.
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    files: Vec<FilePayload>,
}

impl UploadBatch {
    pub fn push(&mut self, file: FilePayload) {
        self.files.push(file);
    }

    /// Remove the entry at `idx`, returning it when the index is valid.
    pub fn remove(&mut self, idx: usize) -> Option<FilePayload> {
        if idx < self.files.len() {
            Some(self.files.remove(idx))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> &[FilePayload] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_preserves_order() {
        let mut batch = UploadBatch::default();
        batch.push(FilePayload::new("a.docx", b"a".to_vec()));
        batch.push(FilePayload::new("b.docx", b"b".to_vec()));
        batch.push(FilePayload::new("c.docx", b"c".to_vec()));

        let removed = batch.remove(1).expect("index 1 exists");
        assert_eq!(removed.file_name, "b.docx");

        let names: Vec<_> = batch.files().iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.docx", "c.docx"]);
    }

    #[test]
    fn remove_out_of_bounds_is_none() {
        let mut batch = UploadBatch::default();
        batch.push(FilePayload::new("a.docx", b"a".to_vec()));
        assert!(batch.remove(3).is_none());
        assert_eq!(batch.len(), 1);
    }
}
