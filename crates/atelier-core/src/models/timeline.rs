use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::edited_image::EditedImage;
use super::generated_video::GeneratedVideo;
use super::media_asset::MediaAsset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    MediaAsset,
    EditedImage,
    GeneratedVideo,
}

/// Row backing a timeline node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NodeData {
    MediaAsset(MediaAsset),
    EditedImage(EditedImage),
    GeneratedVideo(GeneratedVideo),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineNode {
    pub id: Uuid,
    pub label: String,
    /// Absent for videos that have not produced a file yet.
    pub display_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: NodeData,
}

impl TimelineNode {
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::MediaAsset(_) => NodeKind::MediaAsset,
            NodeData::EditedImage(_) => NodeKind::EditedImage,
            NodeData::GeneratedVideo(_) => NodeKind::GeneratedVideo,
        }
    }
}

/// Derivation edge from `source` to `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEdge {
    pub id: String,
    pub source: Uuid,
    pub target: Uuid,
}

impl TimelineEdge {
    pub fn new(source: Uuid, target: Uuid) -> Self {
        Self {
            id: format!("{}->{}", source, target),
            source,
            target,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    pub nodes: Vec<TimelineNode>,
    pub edges: Vec<TimelineEdge>,
}

impl TimelineData {
    pub fn node(&self, id: Uuid) -> Option<&TimelineNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_edge(&self, source: Uuid, target: Uuid) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_id_joins_endpoints() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let edge = TimelineEdge::new(a, b);
        assert_eq!(edge.id, format!("{a}->{b}"));

        let data = TimelineData {
            nodes: vec![],
            edges: vec![edge],
        };
        assert!(data.has_edge(a, b));
        assert!(!data.has_edge(b, a));
    }

    #[test]
    fn node_serializes_with_type_tag() {
        let now = Utc::now();
        let asset = MediaAsset {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            lineage_id: None,
            file_name: "a.png".into(),
            file_type: "image/png".into(),
            file_size: 10,
            width: None,
            height: None,
            storage_path: "a.png".into(),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        };
        let node = TimelineNode {
            id: asset.id,
            label: asset.file_name.clone(),
            display_url: Some("http://localhost/a.png".into()),
            created_at: now,
            data: NodeData::MediaAsset(asset),
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "media_asset");
        assert_eq!(json["data"]["file_name"], "a.png");
        assert_eq!(node.kind(), NodeKind::MediaAsset);
    }
}
