mod common;

use common::{TestContext, about_source, write_about};
use std::fs;
use std::sync::Arc;
use theme_manager::{
    CacheStore, FileCacheStore, SearchPaths, ThemeIndexer, cache::cache_key_for_root,
};

#[test]
fn test_single_theme_example() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo Theme"));

    let registry = ctx.indexer().available_themes(false);
    assert_eq!(registry.len(), 1);
    let foo = registry.get("foo").unwrap();
    assert_eq!(foo.identifier, "foo");
    assert_eq!(foo.name, "Foo Theme");
    assert_eq!(foo.folder, "foo");
    assert_eq!(foo.origin, "core");
    assert!(foo.screenshot_url.is_none());
    assert!(foo.hooks_file.is_none());
    assert_eq!(foo.theme_root, ctx.core.join("foo"));
}

#[test]
fn test_repeated_calls_do_not_rescan() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    write_about(&ctx.local, "bar", &about_source("bar", "Bar"));
    let indexer = ctx.indexer();

    let first = indexer.available_themes(false);
    let after_first = indexer.stats();
    let second = indexer.available_themes(false);

    assert_eq!(first, second);
    assert_eq!(indexer.stats(), after_first);
    assert_eq!(after_first.paths_reindexed, 2);
    assert_eq!(after_first.candidates_scanned, 2);
}

#[test]
fn test_unchanged_listing_is_served_from_cache() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    let indexer = ctx.indexer();

    let first = indexer.available_themes(false);
    let second = indexer.available_themes(true);
    assert_eq!(first, second);

    let stats = indexer.stats();
    assert_eq!(stats.refreshes, 2);
    assert_eq!(stats.paths_reindexed, 2);
    assert_eq!(stats.cache_hits, 2);
    assert_eq!(stats.candidates_scanned, 1);

    // A second process sharing the cache store does no parsing either.
    let other = ctx.indexer();
    assert_eq!(other.available_themes(false), first);
    assert_eq!(other.stats().candidates_scanned, 0);
}

#[test]
fn test_added_theme_appears_after_refresh() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    let indexer = ctx.indexer();
    assert_eq!(indexer.available_themes(false).len(), 1);

    write_about(&ctx.core, "bar", &about_source("bar", "Bar"));
    assert_eq!(indexer.available_themes(false).len(), 1);

    let refreshed = indexer.available_themes(true);
    assert_eq!(refreshed.len(), 2);
    assert_eq!(refreshed.get("bar").unwrap().folder, "bar");

    write_about(&ctx.core, "baz", &about_source("baz", "Baz"));
    indexer.invalidate();
    assert!(indexer.available_themes(false).contains("baz"));
}

#[test]
fn test_removed_theme_disappears() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    write_about(&ctx.core, "bar", &about_source("bar", "Bar"));
    let indexer = ctx.indexer();
    assert_eq!(indexer.available_themes(false).len(), 2);

    fs::remove_dir_all(ctx.core.join("bar")).unwrap();
    let refreshed = indexer.available_themes(true);
    assert_eq!(refreshed.len(), 1);
    assert!(!refreshed.contains("bar"));
}

#[test]
fn test_content_edit_is_stale_until_purge() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Old Name"));
    let indexer = ctx.indexer();
    assert_eq!(indexer.theme_info("foo").unwrap().name, "Old Name");

    write_about(&ctx.core, "foo", &about_source("foo", "New Name"));
    assert_eq!(indexer.theme_info("foo").unwrap().name, "Old Name");
    assert_eq!(
        indexer.available_themes(true).get("foo").unwrap().name,
        "Old Name"
    );

    indexer.purge_cache().unwrap();
    assert_eq!(indexer.theme_info("foo").unwrap().name, "New Name");
}

#[test]
fn test_later_search_path_wins() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "x", &about_source("x", "Core X"));
    write_about(&ctx.local, "x", &about_source("x", "Local X"));

    let registry = ctx.indexer().available_themes(false);
    let x = registry.get("x").unwrap();
    assert_eq!(x.name, "Local X");
    assert_eq!(x.origin, "local");

    let alternate = ctx.temp.path().join("alternate");
    write_about(&alternate, "x", &about_source("x", "Alternate X"));
    let indexer = ThemeIndexer::new(
        SearchPaths::new(&ctx.core, &ctx.local).with_root(&alternate, "alternate"),
        ctx.cache.clone(),
    );
    assert_eq!(
        indexer.available_themes(false).get("x").unwrap().name,
        "Alternate X"
    );
}

#[test]
fn test_broken_theme_does_not_hide_others() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "good", &about_source("good", "Good"));
    write_about(
        &ctx.core,
        "evil",
        "<?php\n$ThemeInfo['evil'] = array('Name' => system('rm -rf /'));\n",
    );
    write_about(&ctx.core, "open", "<?php\n$ThemeInfo['open'] = array(\n 'Name' => 'Open',\n");
    write_about(
        &ctx.core,
        "twice",
        "<?php\n$ThemeInfo = array('a' => array(), 'b' => array());\n",
    );
    fs::create_dir_all(ctx.core.join("assets")).unwrap();

    let indexer = ctx.indexer();
    let registry = indexer.available_themes(false);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("good"));
    assert_eq!(indexer.stats().candidates_scanned, 5);
}

#[test]
fn test_out_of_range_index_skips_only_that_theme() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "good", &about_source("good", "Good"));
    write_about(
        &ctx.core,
        "huge",
        "<?php\n$ThemeInfo['huge'] = array(9223372036854775807 => 'a');\n",
    );

    let indexer = ctx.indexer();
    let registry = indexer.available_themes(false);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("good"));
    assert!(!registry.contains("huge"));
    assert_eq!(indexer.stats().candidates_scanned, 2);
}

#[cfg(unix)]
#[test]
fn test_symlinked_theme_directory_is_indexed() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    let indexer = ctx.indexer();
    assert_eq!(indexer.available_themes(false).len(), 1);

    let shared = ctx.temp.path().join("shared");
    let target = write_about(&shared, "ocean", &about_source("ocean", "Ocean"));
    std::os::unix::fs::symlink(&target, ctx.core.join("ocean")).unwrap();

    let registry = indexer.available_themes(true);
    assert_eq!(registry.len(), 2);
    let ocean = registry.get("ocean").unwrap();
    assert_eq!(ocean.theme_root, ctx.core.join("ocean"));
    assert_eq!(ocean.origin, "core");
}

#[test]
fn test_missing_roots_are_skipped() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    let indexer = ThemeIndexer::new(
        SearchPaths::new(&ctx.core, ctx.temp.path().join("no-such-dir")),
        ctx.cache.clone(),
    );
    assert_eq!(indexer.available_themes(false).len(), 1);
    assert_eq!(indexer.stats().paths_reindexed, 1);
}

#[test]
fn test_cache_entry_shape() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    ctx.indexer().available_themes(false);

    let entry = ctx.cache.get(&cache_key_for_root(&ctx.core)).unwrap();
    assert_eq!(entry["integrity_hash"].as_str().unwrap().len(), 64);
    assert_eq!(entry["themes"]["foo"]["name"], "Foo");
}

#[test]
fn test_malformed_cache_entry_triggers_reindex() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    ctx.cache
        .put(
            &cache_key_for_root(&ctx.core),
            serde_json::json!({"something": "else"}),
        )
        .unwrap();

    let indexer = ctx.indexer();
    assert!(indexer.available_themes(false).contains("foo"));
    assert_eq!(indexer.stats().cache_hits, 0);
}

#[test]
fn test_file_cache_store_round_trip() {
    let ctx = TestContext::new();
    write_about(&ctx.core, "foo", &about_source("foo", "Foo"));
    let cache_dir = ctx.temp.path().join("cache");

    let first = ThemeIndexer::new(
        ctx.search_paths(),
        Arc::new(FileCacheStore::new(&cache_dir)),
    );
    let registry = first.available_themes(false);

    let second = ThemeIndexer::new(
        ctx.search_paths(),
        Arc::new(FileCacheStore::new(&cache_dir)),
    );
    assert_eq!(second.available_themes(false), registry);
    assert_eq!(second.stats().candidates_scanned, 0);
    assert_eq!(second.stats().cache_hits, 2);
}
