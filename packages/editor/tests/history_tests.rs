//! Undo/redo behaviour of recorded edits

use zebra_editor::{store, Cursor, EditCommand, Editor, EditorConfig, RawNode};

const DOC: &str = r#"{"type":"ARTICLE","children":[
    {"type":"TITLE","headerType":"h1","children":[{"type":"CHARACTER","content":"Title"}]},
    {"type":"PARAGRAPH","children":[{"type":"CHARACTER","content":"first line"}]},
    {"type":"LIST","listType":"ul","children":[
        {"type":"PARAGRAPH","children":[{"type":"CHARACTER","content":"item"}]}
    ]}
]}"#;

fn open() -> anyhow::Result<Editor> {
    Ok(Editor::from_json(EditorConfig::default(), DOC)?)
}

#[test]
fn test_undo_redo_restores_serialization() -> anyhow::Result<()> {
    let mut editor = open()?;
    let root = editor.root();
    let paragraph = editor.tree().get_child(root, 1)?.unwrap();
    let original = editor.to_json()?;

    editor.insert_text(paragraph, 5, " and a")?;
    editor.split(paragraph, 3)?;
    editor.modify_content_decorate(paragraph, 0, 2, Some(&store([("color", "red")])), None)?;
    let edited = editor.to_json()?;

    while editor.can_undo() {
        editor.undo();
    }
    assert_eq!(editor.to_json()?, original);

    while editor.can_redo() {
        editor.redo();
    }
    assert_eq!(editor.to_json()?, edited);
    Ok(())
}

#[test]
fn test_new_edit_clears_redo() -> anyhow::Result<()> {
    let mut editor = open()?;
    let title = editor.tree().get_child(editor.root(), 0)?.unwrap();

    editor.insert_text(title, 5, "!")?;
    editor.undo();
    assert!(editor.can_redo());

    editor.insert_text(title, 0, "A ")?;
    assert!(!editor.can_redo());
    assert_eq!(editor.tree().text(title)?, "A Title");
    Ok(())
}

#[test]
fn test_undo_reports_cursor_before_edit() -> anyhow::Result<()> {
    let mut editor = open()?;
    let title = editor.tree().get_child(editor.root(), 0)?.unwrap();

    editor.insert_text(title, 2, "xyz")?;

    let restored = editor.undo().unwrap();
    assert_eq!(restored.cursor, Some(Cursor::new(title, 2)));
    assert!(restored.components.contains(&title));

    let restored = editor.redo().unwrap();
    assert_eq!(restored.cursor, Some(Cursor::new(title, 5)));
    Ok(())
}

#[test]
fn test_backspace_out_of_list_is_one_step() -> anyhow::Result<()> {
    let mut editor = open()?;
    let root = editor.root();
    let list = editor.tree().get_child(root, 2)?.unwrap();
    let item = editor.tree().get_child(list, 0)?.unwrap();
    let before = editor.to_json()?;

    editor.delete(item, -1, Some(0))?;
    assert_eq!(editor.tree().parent(item)?, Some(root));
    assert!(!editor.tree().contains(list) || editor.tree().parent(list)?.is_none());

    editor.undo();
    assert_eq!(editor.to_json()?, before);
    assert_eq!(editor.history().undo_levels(), 0);
    Ok(())
}

#[test]
fn test_batch_is_one_step() -> anyhow::Result<()> {
    let mut editor = open()?;
    let root = editor.root();
    let paragraph = editor.tree().get_child(root, 1)?.unwrap();
    let before = editor.to_json()?;

    let command = EditCommand::Batch {
        description: "retype".to_string(),
        commands: vec![
            EditCommand::Delete {
                id: paragraph,
                start: 0,
                end: Some(5),
            },
            EditCommand::InsertText {
                id: paragraph,
                index: 0,
                text: "second".to_string(),
            },
        ],
    };
    command.apply(&mut editor)?;

    assert_eq!(editor.tree().text(paragraph)?, "second line");
    assert_eq!(editor.history().undo_levels(), 1);
    assert_eq!(editor.history().undo_description(), Some("retype"));

    editor.undo();
    assert_eq!(editor.to_json()?, before);
    Ok(())
}

#[test]
fn test_failed_batch_rolls_back_everything() -> anyhow::Result<()> {
    let mut editor = open()?;
    let paragraph = editor.tree().get_child(editor.root(), 1)?.unwrap();
    let before = editor.to_json()?;

    let result = editor.batch("broken", |editor| {
        editor.insert_text(paragraph, 0, "ok ")?;
        editor.delete(paragraph, 0, Some(99))
    });

    assert!(result.unwrap_err().is_range_error());
    assert_eq!(editor.to_json()?, before);
    assert!(!editor.can_undo());
    Ok(())
}

#[test]
fn test_undo_levels_are_capped() -> anyhow::Result<()> {
    let config = EditorConfig {
        max_undo_levels: 2,
        ..EditorConfig::default()
    };
    let mut editor = Editor::from_json(config, DOC)?;
    let title = editor.tree().get_child(editor.root(), 0)?.unwrap();

    for (i, c) in ["a", "b", "c"].iter().enumerate() {
        editor.insert_text(title, 5 + i, c)?;
    }

    assert_eq!(editor.history().undo_levels(), 2);
    editor.undo();
    editor.undo();
    assert!(editor.undo().is_none());
    assert_eq!(editor.tree().text(title)?, "Titlea");
    Ok(())
}

#[test]
fn test_undo_after_block_insert() -> anyhow::Result<()> {
    let mut editor = open()?;
    let root = editor.root();
    let title = editor.tree().get_child(root, 0)?.unwrap();
    let before = editor.to_json()?;

    let image = RawNode {
        src: Some("cover.png".to_string()),
        ..RawNode::new("MEDIA")
    };
    editor.insert_block(title, None, &image)?;
    editor.add_empty_paragraph(title, false)?;
    assert_eq!(editor.tree().size(root)?, 5);

    editor.undo();
    editor.undo();
    assert_eq!(editor.to_json()?, before);

    // Components created by undone edits are dropped once history goes
    assert!(editor.clear_history() > 0);
    assert_eq!(editor.to_json()?, before);
    Ok(())
}

#[test]
fn test_undone_split_detaches_tail() -> anyhow::Result<()> {
    let mut editor = open()?;
    let root = editor.root();
    let paragraph = editor.tree().get_child(root, 1)?.unwrap();

    let tail = editor.split(paragraph, 5)?.affected[0];
    editor.undo();

    assert_eq!(editor.tree().parent(tail)?, None);
    assert_eq!(editor.tree().find_children_index(root, tail)?, None);
    assert_eq!(editor.tree().text(paragraph)?, "first line");

    editor.redo();
    assert_eq!(editor.tree().parent(tail)?, Some(root));
    assert_eq!(editor.tree().find_children_index(root, tail)?, Some(2));
    Ok(())
}

#[test]
fn test_failure_caught_inside_batch_is_rolled_back() -> anyhow::Result<()> {
    let mut editor = open()?;
    let paragraph = editor.tree().get_child(editor.root(), 1)?.unwrap();
    let before = editor.to_json()?;

    editor.batch("retype", |editor| {
        let failed = editor.batch("attempt", |editor| {
            editor.insert_text(paragraph, 0, "lost ")?;
            editor.delete(paragraph, 0, Some(99))
        });
        assert!(failed.is_err());
        editor.insert_text(paragraph, 0, "kept ")
    })?;

    assert_eq!(editor.tree().text(paragraph)?, "kept first line");
    assert_eq!(editor.history().undo_levels(), 1);
    editor.undo();
    assert_eq!(editor.to_json()?, before);
    Ok(())
}
