use hdf5::File;
use std::path::{Path, PathBuf};

use super::error::StoreError;
use super::tree::{DirectoryNode, Field, Measurement, Series, TreeNode};

/// A simple struct which wraps around the hdf5-rust library.
///
/// Opens a results store read-only and decodes the detector hierarchy into
/// the closed TreeNode representation in one pass. All kind decisions
/// (directory / 1D / 2D) are made here; nothing downstream inspects the store.
#[derive(Debug)]
pub struct ResultsStore {
    file_handle: File,
    path: PathBuf,
}

// Structure
// Results.h5
// |---- Detector
// |    |---- Board_0
// |    |    |---- OpticalGroup_#
// |    |    |    |---- <module-level dsets>
// |    |    |    |---- Hybrid_#
// |    |    |    |    |---- <hybrid-level dsets>
// |    |    |    |    |---- SSA_# / MPA_#
// |    |    |    |    |    |---- <chip-level dsets, 1D or 2D>

impl ResultsStore {
    /// Open the store at path. Failing to open is fatal for the whole run.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::BadFilePath(path.to_path_buf()));
        }
        Ok(Self {
            file_handle: File::open(path)?,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the tree rooted at base_path (e.g. "Detector/Board_0").
    /// A missing base directory is fatal for the whole run.
    pub fn read_tree(&self, base_path: &str) -> Result<DirectoryNode, StoreError> {
        let group = self
            .file_handle
            .group(base_path)
            .map_err(|_| StoreError::MissingDirectory(base_path.to_string()))?;
        read_directory(&group)
    }
}

fn read_directory(group: &hdf5::Group) -> Result<DirectoryNode, StoreError> {
    let mut node = DirectoryNode::new(base_name(&group.name()));
    for member in group.member_names()? {
        if let Ok(subgroup) = group.group(&member) {
            node.children
                .push(TreeNode::Directory(read_directory(&subgroup)?));
        } else {
            let dataset = group.dataset(&member)?;
            match dataset.ndim() {
                1 => node
                    .children
                    .push(TreeNode::Measurement(Measurement::Series(Series {
                        name: member,
                        values: dataset.read_1d::<f64>()?,
                    }))),
                2 => node
                    .children
                    .push(TreeNode::Measurement(Measurement::Field(Field {
                        name: member,
                        values: dataset.read_2d::<f64>()?,
                    }))),
                rank => {
                    log::warn!("Skipping dataset {member} with unsupported rank {rank}");
                }
            }
        }
    }
    Ok(node)
}

/// Last component of an absolute store path ("/Detector/Board_0" -> "Board_0")
fn base_name(full_path: &str) -> String {
    full_path
        .rsplit('/')
        .next()
        .unwrap_or(full_path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn write_example_store(path: &Path) {
        let file = hdf5::File::create(path).unwrap();
        let board = file
            .create_group("Detector")
            .unwrap()
            .create_group("Board_0")
            .unwrap();
        let module = board.create_group("OpticalGroup_0").unwrap();
        let hybrid = module.create_group("Hybrid_1").unwrap();
        hybrid
            .new_dataset_builder()
            .with_data(&arr1(&[1.0f64, 2.0, 3.0]))
            .create("NoiseDistribution_Hybrid(1)")
            .unwrap();
        let chip = hybrid.create_group("MPA_3").unwrap();
        chip.new_dataset_builder()
            .with_data(&arr2(&[[0.0f64, 1.0], [2.0, 3.0]]))
            .create("2DPixelNoise_Chip(3)")
            .unwrap();
    }

    #[test]
    fn test_read_tree() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("Results.h5");
        write_example_store(&store_path);

        let store = ResultsStore::open(&store_path).unwrap();
        let root = store.read_tree("Detector/Board_0").unwrap();
        assert_eq!(root.name, "Board_0");

        let modules = root.subdirectories("OpticalGroup_");
        assert_eq!(modules.len(), 1);
        let hybrids = modules[0].subdirectories("Hybrid_");
        assert_eq!(hybrids.len(), 1);

        let series: Vec<&Measurement> = hybrids[0].measurements().collect();
        assert_eq!(series.len(), 1);
        match series[0] {
            Measurement::Series(s) => {
                assert_eq!(s.name, "NoiseDistribution_Hybrid(1)");
                assert_eq!(s.stats().unwrap().mean, 2.0);
            }
            Measurement::Field(_) => panic!("expected a 1D measurement"),
        }

        let chips = hybrids[0].subdirectories("MPA_");
        assert_eq!(chips.len(), 1);
        match chips[0].measurements().next().unwrap() {
            Measurement::Field(f) => assert_eq!(f.shape(), (2, 2)),
            Measurement::Series(_) => panic!("expected a 2D measurement"),
        };
    }

    #[test]
    fn test_missing_base_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("Results.h5");
        write_example_store(&store_path);

        let store = ResultsStore::open(&store_path).unwrap();
        match store.read_tree("Detector/Board_9") {
            Err(StoreError::MissingDirectory(path)) => assert_eq!(path, "Detector/Board_9"),
            other => panic!("expected MissingDirectory, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_fatal() {
        match ResultsStore::open(Path::new("no/such/Results.h5")) {
            Err(StoreError::BadFilePath(_)) => (),
            other => panic!("expected BadFilePath, got {other:?}"),
        }
    }
}
