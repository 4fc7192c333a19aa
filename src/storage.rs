use crate::models::{Action, ActionData};
use serde::Deserialize;
use std::path::Path;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{error, info};

/// Accepted layouts of the data file. Older files hold a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredData {
    Current(ActionData),
    Legacy(Vec<Action>),
}

impl From<StoredData> for ActionData {
    fn from(stored: StoredData) -> Self {
        match stored {
            StoredData::Current(mut data) => {
                let floor = next_id_after(&data.actions);
                data.next_id = data.next_id.max(floor);
                data
            }
            StoredData::Legacy(actions) => Self {
                next_id: next_id_after(&actions),
                actions,
            },
        }
    }
}

fn next_id_after(actions: &[Action]) -> u64 {
    actions.iter().map(|action| action.id).max().unwrap_or(0) + 1
}

pub async fn load_data(path: &Path) -> ActionData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<StoredData>(&bytes) {
            Ok(stored) => {
                let data = ActionData::from(stored);
                info!(actions = data.actions.len(), "loaded data file {}", path.display());
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                ActionData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ActionData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            ActionData::default()
        }
    }
}

/// Writes the collection next to `path` and renames it into place, so readers
/// see either the old file or the new one.
pub async fn persist_data(path: &Path, data: &ActionData) -> Result<(), std::io::Error> {
    let payload = serde_json::to_vec_pretty(data)?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("actions.json");
    let tmp = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(&payload).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(err) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(err);
    }
    Ok(())
}
