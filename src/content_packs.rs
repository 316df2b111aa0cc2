use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};
use wildgrove_core::LootTable;
use wildgrove_world::{builtin_species, PlantDefinition};

/// Default directory containing content packs.
pub const CONTENT_PACKS_DIR: &str = "content_packs";

/// Content pack manifest file name.
pub const CONTENT_PACK_MANIFEST_FILE: &str = "pack.json";

/// Species definitions inside a pack.
pub const PLANTS_FILE: &str = "plants.json";

/// Named loot tables inside a pack.
pub const LOOT_FILE: &str = "loot.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentPackManifest {
    /// Human-friendly pack name (defaults to the directory name).
    pub name: Option<String>,
    /// Optional description, purely informational.
    pub description: Option<String>,
    /// Optional author, purely informational.
    pub author: Option<String>,
    /// Optional version string, purely informational.
    pub version: Option<String>,
    /// If false, the pack is ignored.
    pub enabled: bool,
    /// Deterministic pack load ordering (lower loads earlier).
    pub priority: i32,
}

impl Default for ContentPackManifest {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            author: None,
            version: None,
            enabled: true,
            priority: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveredContentPack {
    pub id: String,
    pub dir: PathBuf,
    pub manifest: ContentPackManifest,
}

#[derive(Debug, Deserialize)]
struct PackPlantsFile {
    #[serde(default)]
    plants: Vec<PlantDefinition>,
}

#[derive(Debug, Deserialize)]
struct PackLootFile {
    #[serde(default)]
    tables: BTreeMap<String, LootTable>,
}

/// Everything the packs contributed, merged in load order.
#[derive(Debug, Clone, Default)]
pub struct PackContent {
    pub species: Vec<Arc<PlantDefinition>>,
    pub loot_tables: BTreeMap<String, LootTable>,
}

impl PackContent {
    /// Species to plant: the built-in catalogue followed by pack species.
    pub fn species_with_builtins(&self) -> Vec<Arc<PlantDefinition>> {
        let mut species = builtin_species();
        let known: BTreeSet<String> = species.iter().map(|def| def.id.clone()).collect();
        for def in &self.species {
            if known.contains(&def.id) {
                warn!("Pack species {} shadows a built-in species; skipping", def.id);
                continue;
            }
            species.push(Arc::clone(def));
        }
        species
    }
}

fn load_manifest_strict(pack_dir: &Path, pack_id: &str) -> Result<ContentPackManifest> {
    let manifest_path = pack_dir.join(CONTENT_PACK_MANIFEST_FILE);
    let mut manifest = if !manifest_path.exists() {
        ContentPackManifest::default()
    } else {
        let contents = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?
    };

    if manifest.name.as_deref().unwrap_or("").is_empty() {
        manifest.name = Some(pack_id.to_string());
    }

    Ok(manifest)
}

/// Discover content pack directories under the given root.
///
/// Pack discovery is deterministic: directories are returned in sorted order.
pub fn discover_pack_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err).with_context(|| format!("Failed to read {}", root.display())),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read dir entry in {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

fn pack_id(pack_dir: &Path) -> String {
    pack_dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| pack_dir.display().to_string())
}

fn sort_packs(packs: &mut [DiscoveredContentPack]) {
    packs.sort_by(|a, b| {
        a.manifest
            .priority
            .cmp(&b.manifest.priority)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Discover content packs under the given root, applying manifest ordering and enablement.
///
/// This function is strict: it errors if a manifest exists but can't be read/parsed.
#[cfg(test)]
pub fn discover_packs_strict(root: &Path) -> Result<Vec<DiscoveredContentPack>> {
    let pack_dirs = discover_pack_dirs(root)?;
    let mut packs = Vec::with_capacity(pack_dirs.len());
    for pack_dir in pack_dirs {
        let id = pack_id(&pack_dir);
        let manifest = load_manifest_strict(&pack_dir, &id)?;
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredContentPack {
            id,
            dir: pack_dir,
            manifest,
        });
    }

    sort_packs(&mut packs);
    Ok(packs)
}

/// Discover content packs under the given root, applying manifest ordering and enablement.
///
/// This function is lenient: packs with unreadable/invalid manifests are skipped with a warning.
pub fn discover_packs_lenient(root: &Path) -> Vec<DiscoveredContentPack> {
    let pack_dirs = match discover_pack_dirs(root) {
        Ok(pack_dirs) => pack_dirs,
        Err(err) => {
            warn!(
                "Failed to scan content packs dir {}: {err:#}",
                root.display()
            );
            return Vec::new();
        }
    };

    let mut packs = Vec::with_capacity(pack_dirs.len());
    for pack_dir in pack_dirs {
        let id = pack_id(&pack_dir);
        let manifest = match load_manifest_strict(&pack_dir, &id) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(
                    "Skipping content pack {} due to invalid manifest: {err:#}",
                    pack_dir.display()
                );
                continue;
            }
        };
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredContentPack {
            id,
            dir: pack_dir,
            manifest,
        });
    }

    sort_packs(&mut packs);
    packs
}

fn load_plants_from_file(path: &Path) -> Result<Vec<PlantDefinition>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file: PackPlantsFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(file.plants)
}

fn load_loot_from_file(path: &Path) -> Result<BTreeMap<String, LootTable>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file: PackLootFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(file.tables)
}

/// Load species and loot tables from every enabled pack under `root`.
///
/// Unreadable files are skipped with a warning. The first pack to define a
/// species id or table name wins.
pub fn load_pack_content_lenient(root: &Path) -> PackContent {
    let mut content = PackContent::default();
    let mut species_ids: BTreeSet<String> = BTreeSet::new();

    for pack in discover_packs_lenient(root) {
        let plants_path = pack.dir.join(PLANTS_FILE);
        if plants_path.exists() {
            match load_plants_from_file(&plants_path) {
                Ok(plants) => {
                    for plant in plants {
                        if !species_ids.insert(plant.id.clone()) {
                            warn!(
                                "Ignoring duplicate species {} from {}",
                                plant.id,
                                plants_path.display()
                            );
                            continue;
                        }
                        content.species.push(Arc::new(plant));
                    }
                }
                Err(err) => {
                    warn!(
                        "Failed to load content pack plants {}: {err:#}",
                        plants_path.display()
                    );
                }
            }
        }

        let loot_path = pack.dir.join(LOOT_FILE);
        if loot_path.exists() {
            match load_loot_from_file(&loot_path) {
                Ok(tables) => {
                    for (name, table) in tables {
                        if content.loot_tables.contains_key(&name) {
                            warn!(
                                "Ignoring duplicate loot table {} from {}",
                                name,
                                loot_path.display()
                            );
                            continue;
                        }
                        content.loot_tables.insert(name, table);
                    }
                }
                Err(err) => {
                    warn!(
                        "Failed to load content pack loot {}: {err:#}",
                        loot_path.display()
                    );
                }
            }
        }
    }

    info!(
        species = content.species.len(),
        loot_tables = content.loot_tables.len(),
        "content packs loaded"
    );
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_root(label: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("wildgrove_content_packs_{label}_{timestamp}"))
    }

    #[test]
    fn manifests_control_deterministic_pack_order_and_enablement() {
        let root = unique_temp_root("order");
        fs::create_dir_all(&root).expect("temp root create");

        let pack_b = root.join("b_pack");
        fs::create_dir_all(&pack_b).expect("pack create");
        fs::write(
            pack_b.join(CONTENT_PACK_MANIFEST_FILE),
            r#"{"priority":-5}"#,
        )
        .expect("write manifest");

        let pack_a = root.join("a_pack");
        fs::create_dir_all(&pack_a).expect("pack create");

        let disabled = root.join("c_disabled");
        fs::create_dir_all(&disabled).expect("pack create");
        fs::write(
            disabled.join(CONTENT_PACK_MANIFEST_FILE),
            r#"{"enabled":false}"#,
        )
        .expect("write manifest");

        let packs = discover_packs_strict(&root).expect("discover packs");
        let ids: Vec<_> = packs.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b_pack", "a_pack"]);
        assert_eq!(packs[1].manifest.name.as_deref(), Some("a_pack"));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn invalid_manifest_is_skipped_leniently_but_fails_strictly() {
        let root = unique_temp_root("invalid");
        let broken = root.join("broken");
        fs::create_dir_all(&broken).expect("pack create");
        fs::write(broken.join(CONTENT_PACK_MANIFEST_FILE), "{not json").expect("write");

        assert!(discover_packs_strict(&root).is_err());
        assert!(discover_packs_lenient(&root).is_empty());

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn packs_contribute_species_and_loot_with_first_wins() {
        let root = unique_temp_root("content");
        let first = root.join("a_flora");
        let second = root.join("b_flora");
        fs::create_dir_all(&first).expect("pack create");
        fs::create_dir_all(&second).expect("pack create");

        fs::write(
            first.join(PLANTS_FILE),
            r#"{"plants":[{"id":"marsh_reed","name":"marsh reed","hp":20.0,
                "vegetationContribution":6.0}]}"#,
        )
        .expect("write plants");
        fs::write(
            second.join(PLANTS_FILE),
            r#"{"plants":[{"id":"marsh_reed","name":"imposter","hp":1.0}]}"#,
        )
        .expect("write plants");
        fs::write(
            first.join(LOOT_FILE),
            r#"{"tables":{"forage":{"entries":[{"item":"reed","baseChance":40.0}]}}}"#,
        )
        .expect("write loot");
        fs::write(second.join(LOOT_FILE), "[broken").expect("write loot");

        let content = load_pack_content_lenient(&root);
        assert_eq!(content.species.len(), 1);
        assert_eq!(content.species[0].name, "marsh reed");
        assert_eq!(content.loot_tables["forage"].entries[0].item, "reed");

        let all = content.species_with_builtins();
        assert_eq!(all.len(), builtin_species().len() + 1);
        assert_eq!(all.last().map(|d| d.id.as_str()), Some("marsh_reed"));

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_root_yields_no_content() {
        let content = load_pack_content_lenient(&unique_temp_root("missing"));
        assert!(content.species.is_empty());
        assert!(content.loot_tables.is_empty());
    }
}
