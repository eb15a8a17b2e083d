use crate::args::{CategoriesArgs, CategoryCommand};
use crate::commands::Out;
use crate::model::{Categories, Category};
use crate::{Config, Result};
use anyhow::ensure;
use tracing::debug;

/// Lists the categories in display order, or changes them first when a subcommand is given.
/// Archived categories are marked.
///
/// The category that new expenses fall back to cannot be archived or deleted; pick another one
/// with `cashbook config set --default-category` first.
pub async fn categories(config: Config, args: &CategoriesArgs) -> Result<Out<Vec<Category>>> {
    let store = config.store();
    let mut categories = store.categories().await?;

    let action = match args.action() {
        None | Some(CategoryCommand::List) => None,
        Some(CategoryCommand::Add { name, icon }) => {
            let added = categories.add(name, icon.as_deref())?;
            Some(format!("Added category '{}'", added.name()))
        }
        Some(CategoryCommand::Archive { name }) => {
            ensure_not_default(&config, &categories, name, "archived")?;
            let archived = categories.set_archived(name, true)?;
            Some(format!("Archived category '{}'", archived.name()))
        }
        Some(CategoryCommand::Unarchive { name }) => {
            let restored = categories.set_archived(name, false)?;
            Some(format!("Restored category '{}'", restored.name()))
        }
        Some(CategoryCommand::Reorder { names }) => {
            categories.reorder(names)?;
            Some(String::from("Reordered categories"))
        }
        Some(CategoryCommand::Delete { name }) => {
            ensure_not_default(&config, &categories, name, "deleted")?;
            let removed = categories.remove(name)?;
            Some(format!("Deleted category '{}'", removed.name()))
        }
    };
    if action.is_some() {
        store.save_categories(&categories).await?;
        debug!("Saved {} categories", categories.data().len());
    }

    let sorted: Vec<Category> = categories.sorted().into_iter().cloned().collect();
    let listing = if categories.is_empty() {
        String::from("No categories")
    } else {
        sorted
            .iter()
            .map(|c| {
                if c.is_archived() {
                    format!("{} (archived)", c.name())
                } else {
                    c.name().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let message = match action {
        Some(action) => format!("{action}\n{listing}"),
        None => listing,
    };
    Ok(Out::new(message, sorted))
}

fn ensure_not_default(
    config: &Config,
    categories: &Categories,
    name: &str,
    verb: &str,
) -> Result<()> {
    let is_default = categories
        .find_by_name(name)
        .is_some_and(|c| c.id() == config.default_category_id());
    ensure!(
        !is_default,
        "'{}' is the default category and cannot be {verb}",
        name.trim()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{ConfigArgs, ConfigCommand, ConfigSetArgs};
    use crate::commands::settings;
    use crate::model::{COFFEE_ID, OTHER_ID, RENT_ID};
    use crate::test::TestEnv;

    fn list() -> CategoriesArgs {
        CategoriesArgs::default()
    }

    fn names(out: &Out<Vec<Category>>) -> Vec<&str> {
        out.structure().unwrap().iter().map(|c| c.name()).collect()
    }

    #[tokio::test]
    async fn test_categories() {
        let env = TestEnv::new().await;
        let out = categories(env.config(), &list()).await.unwrap();
        let lines: Vec<&str> = out.message().lines().collect();
        assert_eq!(lines.first(), Some(&"Food"));
        assert_eq!(lines.last(), Some(&"Other"));
        assert_eq!(out.structure().unwrap().len(), 10);

        let explicit = categories(env.config(), &CategoriesArgs::new(CategoryCommand::List))
            .await
            .unwrap();
        assert_eq!(explicit.message(), out.message());
    }

    #[tokio::test]
    async fn test_categories_reads_the_store() {
        let env = TestEnv::new().await;
        let custom = Categories::new(vec![Category::new("Books", 0), Category::new("Art", 0)]);
        env.config().store().save_categories(&custom).await.unwrap();

        let out = categories(env.config(), &list()).await.unwrap();
        assert_eq!(out.message(), "Art\nBooks");
    }

    #[tokio::test]
    async fn test_categories_empty() {
        let env = TestEnv::new().await;
        env.config()
            .store()
            .save_categories(&Categories::default())
            .await
            .unwrap();
        let out = categories(env.config(), &list()).await.unwrap();
        assert_eq!(out.message(), "No categories");
        assert!(out.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_category() {
        let env = TestEnv::new().await;
        let add = CategoryCommand::Add {
            name: String::from(" Books "),
            icon: Some(String::from("book.fill")),
        };
        let out = categories(env.config(), &CategoriesArgs::new(add.clone()))
            .await
            .unwrap();
        assert!(out.message().starts_with("Added category 'Books'\n"));
        assert_eq!(names(&out).last(), Some(&"Books"));

        let stored = env.config().store().categories().await.unwrap();
        let books = stored.find_by_name("books").unwrap();
        assert_eq!(books.icon(), "book.fill");
        assert_eq!(books.sort_order(), 10);

        assert!(categories(env.config(), &CategoriesArgs::new(add))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_archive_and_unarchive() {
        let env = TestEnv::new().await;
        let archive = CategoryCommand::Archive {
            name: String::from("coffee"),
        };
        let out = categories(env.config(), &CategoriesArgs::new(archive))
            .await
            .unwrap();
        assert!(out.message().contains("Coffee (archived)"));
        let stored = env.config().store().categories().await.unwrap();
        assert!(stored.get(COFFEE_ID).unwrap().is_archived());

        let unarchive = CategoryCommand::Unarchive {
            name: String::from("Coffee"),
        };
        categories(env.config(), &CategoriesArgs::new(unarchive))
            .await
            .unwrap();
        let stored = env.config().store().categories().await.unwrap();
        assert!(!stored.get(COFFEE_ID).unwrap().is_archived());
    }

    #[tokio::test]
    async fn test_other_and_default_are_protected() {
        let env = TestEnv::new().await;
        for action in [
            CategoryCommand::Archive {
                name: String::from("Other"),
            },
            CategoryCommand::Delete {
                name: String::from("Other"),
            },
        ] {
            assert!(categories(env.config(), &CategoriesArgs::new(action))
                .await
                .is_err());
        }

        let set = ConfigSetArgs::default().with_default_category("Rent");
        settings(env.config(), &ConfigArgs::new(ConfigCommand::Set(set)))
            .await
            .unwrap();
        let archive = CategoryCommand::Archive {
            name: String::from("rent"),
        };
        let err = categories(env.reload().await, &CategoriesArgs::new(archive))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is the default category"));

        let stored = env.config().store().categories().await.unwrap();
        assert!(!stored.get(RENT_ID).unwrap().is_archived());
        assert!(!stored.get(OTHER_ID).unwrap().is_archived());
    }

    #[tokio::test]
    async fn test_reorder_and_delete() {
        let env = TestEnv::new().await;
        let reorder = CategoryCommand::Reorder {
            names: vec![String::from("Other"), String::from("Coffee")],
        };
        let out = categories(env.config(), &CategoriesArgs::new(reorder))
            .await
            .unwrap();
        assert_eq!(names(&out)[..3], ["Other", "Coffee", "Food"]);

        let delete = CategoryCommand::Delete {
            name: String::from("Coffee"),
        };
        let out = categories(env.config(), &CategoriesArgs::new(delete))
            .await
            .unwrap();
        assert!(out.message().starts_with("Deleted category 'Coffee'\n"));
        assert_eq!(names(&out)[..2], ["Other", "Food"]);
        let stored = env.config().store().categories().await.unwrap();
        assert!(stored.get(COFFEE_ID).is_none());
        let orders: Vec<u32> = stored.sorted().iter().map(|c| c.sort_order()).collect();
        assert_eq!(orders, (0..9).collect::<Vec<u32>>());
    }
}
