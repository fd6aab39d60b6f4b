//! Folder crawler
//!
//! Walks a folder tree depth-first from a root folder using an injected
//! [`StorageListing`]. Folders are recorded in pre-order; a folder's media
//! files are collected once all of its child subtrees are done.
//!
//! The crawl is best effort: a failed listing call is recorded as a
//! [`CrawlFailure`] and the walk carries on with everything else.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::drive::StorageListing;
use crate::media::{FileInfo, FolderNode, is_media_file};

/// Which listing call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStage {
    ListFolders,
    ListFiles,
}

/// A listing call that failed and the part of the tree it cost us
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlFailure {
    pub folder_id: String,
    pub folder_path: String,
    pub stage: CrawlStage,
    pub message: String,
}

/// Result of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Every visited folder, parents before children
    pub folders: Vec<FolderNode>,
    /// Media files tagged with their folder path
    pub files: Vec<FileInfo>,
    /// Listing calls that failed; their subtrees are partially missing
    pub failures: Vec<CrawlFailure>,
}

impl CrawlReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

enum Step {
    Enter {
        id: String,
        name: String,
        parent: Option<usize>,
    },
    CollectFiles(usize),
}

/// Crawl the tree below `root_id`.
///
/// `root_label` is both the root's name and the folder path of its files.
/// Ids already seen are never entered twice, so cyclic listings terminate.
pub async fn crawl<L>(root_id: &str, root_label: &str, listing: &L) -> CrawlReport
where
    L: StorageListing + ?Sized,
{
    let mut report = CrawlReport::default();
    let mut visited: HashSet<String> = HashSet::from([root_id.to_string()]);
    let mut stack = vec![Step::Enter {
        id: root_id.to_string(),
        name: root_label.to_string(),
        parent: None,
    }];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter { id, name, parent } => {
                let index = report.folders.len();
                let (path, depth, parent_id) = match parent {
                    None => (root_label.to_string(), 0, None),
                    Some(p) => {
                        let parent_node = &report.folders[p];
                        let path = if parent_node.is_root() {
                            name.clone()
                        } else {
                            format!("{}/{}", parent_node.path, name)
                        };
                        (path, parent_node.depth + 1, Some(parent_node.id.clone()))
                    }
                };
                report.folders.push(FolderNode {
                    id: id.clone(),
                    name,
                    parent_id,
                    path,
                    depth,
                });

                stack.push(Step::CollectFiles(index));

                match listing.list_child_folders(&id).await {
                    Ok(children) => {
                        let mut fresh = Vec::with_capacity(children.len());
                        for child in children {
                            if visited.insert(child.id.clone()) {
                                fresh.push(child);
                            } else {
                                debug!(folder_id = %child.id, parent_id = %id, "Skipping already visited folder");
                            }
                        }
                        // Reversed so the first listed child is entered first
                        for child in fresh.into_iter().rev() {
                            stack.push(Step::Enter {
                                id: child.id,
                                name: child.name,
                                parent: Some(index),
                            });
                        }
                    }
                    Err(e) => {
                        let folder = &report.folders[index];
                        warn!(
                            folder_id = %folder.id,
                            folder_path = %folder.path,
                            error = %e,
                            "Failed to list child folders, skipping subtree"
                        );
                        report.failures.push(CrawlFailure {
                            folder_id: folder.id.clone(),
                            folder_path: folder.path.clone(),
                            stage: CrawlStage::ListFolders,
                            message: e.to_string(),
                        });
                    }
                }
            }
            Step::CollectFiles(index) => {
                let folder = &report.folders[index];
                match listing.list_child_files(&folder.id).await {
                    Ok(files) => {
                        let before = report.files.len();
                        report.files.extend(files.into_iter().filter(is_media_file).map(
                            |file| FileInfo {
                                file,
                                folder_id: folder.id.clone(),
                                folder_path: folder.path.clone(),
                            },
                        ));
                        debug!(
                            folder_path = %folder.path,
                            files = report.files.len() - before,
                            "Collected media files"
                        );
                    }
                    Err(e) => {
                        warn!(
                            folder_id = %folder.id,
                            folder_path = %folder.path,
                            error = %e,
                            "Failed to list media files, skipping folder"
                        );
                        report.failures.push(CrawlFailure {
                            folder_id: folder.id.clone(),
                            folder_path: folder.path.clone(),
                            stage: CrawlStage::ListFiles,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    info!(
        root_id = %root_id,
        folders = report.folders.len(),
        files = report.files.len(),
        failures = report.failures.len(),
        "Crawl completed"
    );

    report
}
