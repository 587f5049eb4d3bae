//! Recipe and category tables: built-in defaults plus JSON loading.

use anyhow::{Context, Result};
use flatcraft_core::{create_item, CategoryTable, Item, Recipe, Stack, ThingId};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

fn item(id: &str) -> Result<Item> {
    let id: ThingId = id.parse()?;
    Ok(create_item(&id)?)
}

fn cell(id: &str) -> Option<String> {
    Some(id.to_string())
}

fn recipe(pattern: Vec<Vec<Option<String>>>, result_id: &str, quantity: u32) -> Result<Recipe> {
    let result = Stack::new(item(result_id)?, quantity);
    Recipe::new(pattern, result).with_context(|| format!("recipe for {result_id}"))
}

/// The built-in 2x2 recipe table, in match-priority order.
pub fn default_recipes_2x2() -> Result<Vec<Recipe>> {
    Ok(vec![
        recipe(
            vec![vec![None, cell("wood")], vec![None, cell("wood")]],
            "stick",
            4,
        )?,
        recipe(
            vec![
                vec![cell("stick"), cell("stick")],
                vec![cell("stick"), cell("stick")],
            ],
            "wood",
            2,
        )?,
        recipe(
            vec![vec![cell("coal"), None], vec![cell("stick"), None]],
            "torch",
            4,
        )?,
    ])
}

/// The built-in 3x3 recipe table, in match-priority order.
pub fn default_recipes_3x3() -> Result<Vec<Recipe>> {
    Ok(vec![
        recipe(
            vec![
                vec![None, None, None],
                vec![None, cell("wood"), None],
                vec![None, cell("wood"), None],
            ],
            "stick",
            16,
        )?,
        recipe(
            vec![
                vec![cell("wood"), cell("wood"), cell("wood")],
                vec![None, cell("stick"), None],
                vec![None, cell("stick"), None],
            ],
            "pickaxe:wood",
            1,
        )?,
        recipe(
            vec![
                vec![cell("wood"), cell("wood"), None],
                vec![cell("wood"), cell("stick"), None],
                vec![None, cell("stick"), None],
            ],
            "axe:wood",
            1,
        )?,
        recipe(
            vec![
                vec![None, cell("wood"), None],
                vec![None, cell("stick"), None],
                vec![None, cell("stick"), None],
            ],
            "shovel:wood",
            1,
        )?,
        recipe(
            vec![
                vec![None, cell("stone"), None],
                vec![None, cell("stone"), None],
                vec![None, cell("stick"), None],
            ],
            "sword:wood",
            1,
        )?,
    ])
}

/// The built-in category table: interchangeable wood variants.
pub fn default_categories() -> CategoryTable {
    let mut categories = CategoryTable::new();
    categories.insert(
        "wood".to_string(),
        BTreeSet::from(["wood".to_string(), "oak_wood".to_string(), "birch_wood".to_string()]),
    );
    categories
}

/// One recipe as authored in a JSON table.
#[derive(Debug, Deserialize)]
struct RecipeSpec {
    pattern: Vec<Vec<Option<String>>>,
    result: String,
    #[serde(default = "one")]
    quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct RecipeFile {
    recipes: Vec<RecipeSpec>,
}

/// Parse a JSON recipe table, preserving its order.
pub fn recipes_from_str(contents: &str) -> Result<Vec<Recipe>> {
    let file: RecipeFile = serde_json::from_str(contents).context("parsing recipe table")?;
    file.recipes
        .into_iter()
        .map(|spec| recipe(spec.pattern, &spec.result, spec.quantity))
        .collect()
}

/// Load a JSON recipe table from disk.
pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading recipe table {}", path.display()))?;
    recipes_from_str(&contents)
}

/// Parse a JSON category table.
pub fn categories_from_str(contents: &str) -> Result<CategoryTable> {
    serde_json::from_str(contents).context("parsing category table")
}

/// Load a JSON category table from disk.
pub fn load_categories(path: &Path) -> Result<CategoryTable> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading category table {}", path.display()))?;
    categories_from_str(&contents)
}
