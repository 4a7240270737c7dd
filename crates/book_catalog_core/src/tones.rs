//! crates/book_catalog_core/src/tones.rs
//!
//! The tone taxonomy: suggestion of tones for a book, the genre -> tone
//! lexicon the suggestions draw on, the parent/subtone tree view, and the
//! configuration write path.
//!
//! Tones are stored flat as `{id, name, description, parent_id}`. The tree is
//! rebuilt by grouping on `parent_id` whenever it is read.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::domain::{NewTone, Tone};
use crate::ports::{CatalogStore, PortError, PortResult};

//=========================================================================================
// Genre -> Tone Lexicon
//=========================================================================================

/// One lexicon entry: a genre (grouping) name and the tone names it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreToneAssociation {
    pub genre: String,
    pub tones: Vec<String>,
}

/// Hand-curated genre -> tone-name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreToneLexicon {
    associations: Vec<GenreToneAssociation>,
}

const BUILTIN_LEXICON: &[(&str, &[&str])] = &[
    ("Fantasy", &["Whimsical", "Epic", "Adventurous", "Magical", "Hopeful"]),
    ("Science Fiction", &["Thought-provoking", "Cerebral", "Speculative", "Adventurous"]),
    ("Dystopian", &["Bleak", "Dark", "Tense", "Thought-provoking", "Political"]),
    ("Horror", &["Dark", "Creepy", "Unsettling", "Tense", "Atmospheric"]),
    ("Mystery", &["Suspenseful", "Puzzling", "Atmospheric", "Tense"]),
    ("Thriller", &["Suspenseful", "Tense", "Fast-paced", "Dark"]),
    ("Romance", &["Romantic", "Heartwarming", "Emotional", "Hopeful"]),
    ("Historical Fiction", &["Atmospheric", "Reflective", "Emotional", "Immersive"]),
    ("Literary Fiction", &["Reflective", "Melancholic", "Character-driven", "Lyrical"]),
    ("Classics", &["Reflective", "Challenging", "Lyrical"]),
    ("Young Adult", &["Coming-of-age", "Emotional", "Hopeful", "Fast-paced"]),
    ("Humor", &["Funny", "Lighthearted", "Witty", "Absurd"]),
    ("Adventure", &["Adventurous", "Fast-paced", "Epic"]),
    ("Crime", &["Gritty", "Dark", "Suspenseful"]),
    ("Gothic", &["Atmospheric", "Dark", "Melancholic", "Creepy"]),
    ("Magical Realism", &["Whimsical", "Dreamlike", "Lyrical", "Reflective"]),
    ("Poetry", &["Lyrical", "Reflective", "Emotional"]),
];

impl GenreToneLexicon {
    pub fn new(associations: Vec<GenreToneAssociation>) -> Self {
        Self { associations }
    }

    /// The lexicon shipped with the service.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_LEXICON
                .iter()
                .map(|(genre, tones)| GenreToneAssociation {
                    genre: genre.to_string(),
                    tones: tones.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        )
    }

    /// Parses a JSON array of `{"genre": .., "tones": [..]}` objects.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<GenreToneAssociation>>(json).map(Self::new)
    }

    pub fn associations(&self) -> &[GenreToneAssociation] {
        &self.associations
    }

    /// Tone names associated with `genre`, matched case-insensitively.
    pub fn tones_for(&self, genre: &str) -> Option<&[String]> {
        self.associations
            .iter()
            .find(|a| a.genre.eq_ignore_ascii_case(genre))
            .map(|a| a.tones.as_slice())
    }

    /// True when any of `genres` lists `tone_name`.
    pub fn associates(&self, genres: &[String], tone_name: &str) -> bool {
        genres.iter().any(|genre| {
            self.tones_for(genre)
                .is_some_and(|tones| tones.iter().any(|t| t.eq_ignore_ascii_case(tone_name)))
        })
    }
}

impl Default for GenreToneLexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

//=========================================================================================
// Tone Suggestion Engine
//=========================================================================================

/// What the engine knows about a book.
#[derive(Debug, Clone, Copy)]
pub struct ToneSuggestionInput<'a> {
    pub bookshelf_names: &'a [String],
    /// Distinct grouping names across the book's shelves.
    pub genres: &'a [String],
    pub searchable_string: &'a str,
    pub review: &'a str,
}

/// Proposes tones for a book. Parents and subtones are considered alike; a
/// tone is suggested when its name appears in a shelf name, the search string
/// or the review, or when one of the book's genres lists it in the lexicon.
pub fn suggest_tones(
    input: &ToneSuggestionInput<'_>,
    tones: &[Tone],
    lexicon: &GenreToneLexicon,
) -> BTreeSet<Uuid> {
    let shelves: Vec<String> = input
        .bookshelf_names
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    let searchable = input.searchable_string.to_lowercase();
    let review = input.review.to_lowercase();

    tones
        .iter()
        .filter(|tone| {
            let name = tone.name.to_lowercase();
            if name.is_empty() {
                return false;
            }
            shelves.iter().any(|shelf| shelf.contains(&name))
                || searchable.contains(&name)
                || review.contains(&name)
                || lexicon.associates(input.genres, &tone.name)
        })
        .map(|tone| tone.id)
        .collect()
}

//=========================================================================================
// Tone Tree
//=========================================================================================

/// A top-level tone with its subtones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneNode {
    pub tone: Tone,
    pub subtones: Vec<Tone>,
}

/// Groups a flat tone list into parents with their subtones, both sorted by
/// name. A subtone whose parent is missing, or is itself a subtone, is shown
/// at the top level.
pub fn build_tone_tree(tones: Vec<Tone>) -> Vec<ToneNode> {
    let ids: HashSet<Uuid> = tones.iter().map(|t| t.id).collect();
    let top_level: HashSet<Uuid> = tones
        .iter()
        .filter(|t| t.parent_id.map_or(true, |p| !ids.contains(&p)))
        .map(|t| t.id)
        .collect();
    let (children, parents): (Vec<Tone>, Vec<Tone>) = tones
        .into_iter()
        .partition(|t| t.parent_id.is_some_and(|p| top_level.contains(&p)));

    let mut by_parent: HashMap<Uuid, Vec<Tone>> = HashMap::new();
    for child in children {
        if let Some(parent_id) = child.parent_id {
            by_parent.entry(parent_id).or_default().push(child);
        }
    }

    let mut nodes: Vec<ToneNode> = parents
        .into_iter()
        .map(|tone| {
            let mut subtones = by_parent.remove(&tone.id).unwrap_or_default();
            subtones.sort_by_key(|t| t.name.to_lowercase());
            ToneNode { tone, subtones }
        })
        .collect();
    nodes.sort_by_key(|n| n.tone.name.to_lowercase());
    nodes
}

//=========================================================================================
// Tone Configuration
//=========================================================================================

/// A tone (or subtone) as submitted by the configuration screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToneConfigItem {
    /// `None` creates a new tone.
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub remove: bool,
    pub subtones: Vec<ToneConfigItem>,
}

/// Applies a tone configuration and returns the resulting tree.
///
/// Removing a tone removes its subtones too. Subtones may not carry subtones
/// of their own, and names must be unique across everything kept.
pub async fn configure_tones(
    store: &dyn CatalogStore,
    items: &[ToneConfigItem],
) -> PortResult<Vec<ToneNode>> {
    validate_tone_config(items)?;

    let existing = store.list_tones().await?;
    let known: HashSet<Uuid> = existing.iter().map(|t| t.id).collect();
    for id in items
        .iter()
        .flat_map(|item| std::iter::once(item).chain(item.subtones.iter()))
        .filter_map(|item| item.id)
    {
        if !known.contains(&id) {
            return Err(PortError::NotFound(format!("Tone {} not found", id)));
        }
    }
    check_resulting_nesting(items, &existing)?;

    // Subtones go before their parents.
    let removed_parents: HashSet<Uuid> = items
        .iter()
        .filter(|item| item.remove)
        .filter_map(|item| item.id)
        .collect();
    let mut removed_subtones: Vec<Uuid> = existing
        .iter()
        .filter(|t| t.parent_id.is_some_and(|p| removed_parents.contains(&p)))
        .map(|t| t.id)
        .collect();
    removed_subtones.extend(
        items
            .iter()
            .filter(|item| !item.remove)
            .flat_map(|item| item.subtones.iter())
            .filter(|sub| sub.remove)
            .filter_map(|sub| sub.id),
    );
    let mut deleted = store.delete_tones(&removed_subtones).await?;
    let parents: Vec<Uuid> = removed_parents.into_iter().collect();
    deleted += store.delete_tones(&parents).await?;

    let mut created = 0usize;
    let mut updated = 0usize;
    for item in items.iter().filter(|item| !item.remove) {
        let parent_id = match item.id {
            Some(id) => {
                store
                    .update_tone(&Tone {
                        id,
                        name: item.name.trim().to_string(),
                        description: item.description.clone(),
                        parent_id: None,
                    })
                    .await?;
                updated += 1;
                id
            }
            None => {
                created += 1;
                store
                    .create_tone(NewTone {
                        name: item.name.trim().to_string(),
                        description: item.description.clone(),
                        parent_id: None,
                    })
                    .await?
                    .id
            }
        };

        for sub in item.subtones.iter().filter(|sub| !sub.remove) {
            match sub.id {
                Some(id) => {
                    store
                        .update_tone(&Tone {
                            id,
                            name: sub.name.trim().to_string(),
                            description: sub.description.clone(),
                            parent_id: Some(parent_id),
                        })
                        .await?;
                    updated += 1;
                }
                None => {
                    store
                        .create_tone(NewTone {
                            name: sub.name.trim().to_string(),
                            description: sub.description.clone(),
                            parent_id: Some(parent_id),
                        })
                        .await?;
                    created += 1;
                }
            }
        }
    }

    info!(created, updated, deleted, "Saved tone configuration");
    Ok(build_tone_tree(store.list_tones().await?))
}

fn validate_tone_config(items: &[ToneConfigItem]) -> PortResult<()> {
    let mut names = HashSet::new();
    for item in items.iter().filter(|item| !item.remove) {
        check_name(&mut names, &item.name)?;
        for sub in item.subtones.iter().filter(|sub| !sub.remove) {
            if !sub.subtones.is_empty() {
                return Err(PortError::Invalid(format!(
                    "Subtone '{}' cannot have subtones of its own",
                    sub.name.trim()
                )));
            }
            check_name(&mut names, &sub.name)?;
        }
    }
    Ok(())
}

/// Rejects a request that would leave a subtone with subtones of its own,
/// such as demoting a tone that still has children.
fn check_resulting_nesting(items: &[ToneConfigItem], existing: &[Tone]) -> PortResult<()> {
    let mut parents: HashMap<Uuid, Option<Uuid>> =
        existing.iter().map(|t| (t.id, t.parent_id)).collect();
    let mut removed: HashSet<Uuid> = HashSet::new();
    for item in items {
        let Some(id) = item.id else { continue };
        if item.remove {
            removed.insert(id);
            removed.extend(existing.iter().filter(|t| t.parent_id == Some(id)).map(|t| t.id));
            continue;
        }
        parents.insert(id, None);
        for sub in item.subtones.iter() {
            let Some(sub_id) = sub.id else { continue };
            if sub.remove {
                removed.insert(sub_id);
            } else {
                parents.insert(sub_id, Some(id));
            }
        }
    }

    for (id, parent) in parents.iter().filter(|(id, _)| !removed.contains(*id)) {
        let Some(parent_id) = parent else { continue };
        if parents.get(parent_id).copied().flatten().is_some() {
            let name = |tone_id: &Uuid| {
                existing
                    .iter()
                    .find(|t| t.id == *tone_id)
                    .map_or_else(|| tone_id.to_string(), |t| t.name.clone())
            };
            return Err(PortError::Invalid(format!(
                "Tone '{}' cannot become a subtone while it has subtone '{}'",
                name(parent_id),
                name(id)
            )));
        }
    }
    Ok(())
}

fn check_name(seen: &mut HashSet<String>, name: &str) -> PortResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PortError::Invalid("Tone names cannot be empty".to_string()));
    }
    if !seen.insert(name.to_lowercase()) {
        return Err(PortError::Invalid(format!("Duplicate tone name '{}'", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(name: &str, parent_id: Option<Uuid>) -> Tone {
        Tone {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            parent_id,
        }
    }

    #[test]
    fn genre_association_suggests_every_listed_tone() {
        let lexicon = GenreToneLexicon::builtin();
        let bleak = tone("Bleak", None);
        let political = tone("Political", None);
        let funny = tone("Funny", None);
        let tones = vec![bleak.clone(), political.clone(), funny.clone()];

        let shelves = vec!["dystopian".to_string()];
        let genres = vec!["Dystopian".to_string()];
        let input = ToneSuggestionInput {
            bookshelf_names: &shelves,
            genres: &genres,
            searchable_string: "we yevgeny zamyatin dystopian",
            review: "A glass city.",
        };

        let suggested = suggest_tones(&input, &tones, &lexicon);
        assert!(suggested.contains(&bleak.id));
        assert!(suggested.contains(&political.id));
        assert!(!suggested.contains(&funny.id));
    }

    #[test]
    fn text_matches_are_case_insensitive_substrings() {
        let lexicon = GenreToneLexicon::new(Vec::new());
        let parent = tone("Dark", None);
        let cozy = tone("Cozy", Some(parent.id));
        let witty = tone("Witty", None);
        let epic = tone("Epic", None);
        let tones = vec![parent.clone(), cozy.clone(), witty.clone(), epic.clone()];

        let shelves = vec!["Dark-Academia".to_string()];
        let input = ToneSuggestionInput {
            bookshelf_names: &shelves,
            genres: &[],
            searchable_string: "a cozy mystery",
            review: "So WITTY throughout.",
        };

        let suggested = suggest_tones(&input, &tones, &lexicon);
        let expected: BTreeSet<Uuid> = [parent.id, cozy.id, witty.id].into_iter().collect();
        assert_eq!(suggested, expected);
    }

    #[test]
    fn lexicon_parses_json_and_matches_genres_case_insensitively() {
        let lexicon =
            GenreToneLexicon::from_json(r#"[{"genre": "Noir", "tones": ["Gritty", "Moody"]}]"#)
                .unwrap();
        assert!(lexicon.associates(&["noir".to_string()], "moody"));
        assert!(!lexicon.associates(&["Noir".to_string()], "Cheerful"));
        assert_eq!(GenreToneLexicon::builtin().associations().len(), 17);
    }

    #[test]
    fn tree_groups_subtones_under_parents_sorted_by_name() {
        let zest = tone("Zesty", None);
        let dark = tone("Dark", None);
        let grim = tone("Grim", Some(dark.id));
        let bleak = tone("Bleak", Some(dark.id));
        let orphan = tone("Orphaned", Some(Uuid::new_v4()));

        let tree = build_tone_tree(vec![grim, zest, bleak, dark, orphan]);
        let names: Vec<&str> = tree.iter().map(|n| n.tone.name.as_str()).collect();
        assert_eq!(names, vec!["Dark", "Orphaned", "Zesty"]);
        let subtones: Vec<&str> = tree[0].subtones.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(subtones, vec!["Bleak", "Grim"]);
    }

    #[test]
    fn configuration_rejects_nested_subtones_and_duplicate_names() {
        let nested = vec![ToneConfigItem {
            name: "Dark".to_string(),
            subtones: vec![ToneConfigItem {
                name: "Grim".to_string(),
                subtones: vec![ToneConfigItem {
                    name: "Grimmer".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }];
        assert!(matches!(validate_tone_config(&nested), Err(PortError::Invalid(_))));

        let duplicate = vec![
            ToneConfigItem {
                name: "Dark".to_string(),
                ..Default::default()
            },
            ToneConfigItem {
                name: " dark ".to_string(),
                ..Default::default()
            },
        ];
        assert!(matches!(validate_tone_config(&duplicate), Err(PortError::Invalid(_))));
    }
}
