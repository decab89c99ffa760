//! Table grid behaviour through the public editor API

use zebra_editor::{
    CellType, ComponentId, ComponentKind, Editor, EditorConfig, ExchangeTarget, RawNode, TableSize,
};

/// Article holding one table of `rows` body rows and two columns
fn table_doc(rows: &[(&str, &str)], need_head: bool) -> String {
    let cell = |cell_type: &str, text: &str| {
        let content = if text.is_empty() {
            String::new()
        } else {
            format!(r#"{{"type":"CHARACTER","content":"{}"}}"#, text)
        };
        format!(
            r#"{{"type":"TABLE_CELL","cellType":"{t}","children":[{{"type":"TABLE_ITEM","children":[{c}]}}]}}"#,
            t = cell_type,
            c = content
        )
    };
    let row = |cell_type: &str, a: &str, b: &str| {
        format!(
            r#"{{"type":"TABLE_ROW","cellType":"{t}","children":[{},{}]}}"#,
            cell(cell_type, a),
            cell(cell_type, b),
            t = cell_type
        )
    };

    let mut body = Vec::new();
    if need_head {
        body.push(row("th", "k", "v"));
    }
    for (a, b) in rows {
        body.push(row("td", a, b));
    }
    format!(
        r#"{{"type":"ARTICLE","children":[{{"type":"TABLE","col":2,"needHead":{},"children":[{}]}}]}}"#,
        need_head,
        body.join(",")
    )
}

fn open(rows: &[(&str, &str)], need_head: bool) -> anyhow::Result<(Editor, ComponentId)> {
    let editor = Editor::from_json(EditorConfig::default(), &table_doc(rows, need_head))?;
    let table = editor.tree().get_child(editor.root(), 0)?.unwrap();
    Ok((editor, table))
}

fn item(
    editor: &Editor,
    table: ComponentId,
    row: usize,
    col: usize,
) -> anyhow::Result<ComponentId> {
    let tree = editor.tree();
    let row = tree.get_child(table, row)?.unwrap();
    let cell = tree.get_child(row, col)?.unwrap();
    Ok(tree.get_child(cell, 0)?.unwrap())
}

fn assert_grid(editor: &Editor, table: ComponentId) -> anyhow::Result<()> {
    let tree = editor.tree();
    let (col, _) = tree.table_shape(table)?;
    for row in tree.children(table)? {
        assert_eq!(tree.size(*row)?, col);
    }
    Ok(())
}

#[test]
fn test_add_row_after_body() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b"), ("c", "d")], true)?;
    assert_eq!(editor.tree().size(table)?, 3);

    editor.add_row(table, 2)?;

    assert_eq!(editor.tree().size(table)?, 4);
    assert_eq!(editor.tree().table_shape(table)?, (2, true));
    assert_grid(&editor, table)?;
    Ok(())
}

#[test]
fn test_column_operations_keep_grid() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b"), ("c", "d")], true)?;
    let inner = item(&editor, table, 1, 0)?;

    editor.add_col(inner, 1)?;
    assert_eq!(editor.tree().table_shape(table)?, (3, true));
    assert_grid(&editor, table)?;

    // New head cells are th
    let head = editor.tree().get_child(table, 0)?.unwrap();
    let cell = editor.tree().get_child(head, 1)?.unwrap();
    assert_eq!(editor.tree().kind(cell)?, &ComponentKind::TableCell(CellType::Th));

    editor.remove_col(table, 0)?;
    editor.set_table_col(table, 4)?;
    assert_eq!(editor.tree().table_shape(table)?, (4, true));
    assert_grid(&editor, table)?;
    Ok(())
}

#[test]
fn test_remove_last_column_removes_table() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b")], false)?;

    editor.remove_col(table, 1)?;
    editor.remove_col(table, 0)?;

    assert_eq!(editor.tree().size(editor.root())?, 0);
    assert_eq!(editor.tree().parent(table)?, None);
    Ok(())
}

#[test]
fn test_modify_table_head_then_rows() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b")], false)?;

    editor.modify_table(
        table,
        TableSize {
            row: Some(3),
            col: Some(3),
            head: Some(true),
        },
    )?;

    // head + 3 body rows
    assert_eq!(editor.tree().size(table)?, 4);
    assert_eq!(editor.tree().table_shape(table)?, (3, true));
    assert_eq!(editor.tree().text(item(&editor, table, 1, 0)?)?, "a");
    assert_grid(&editor, table)?;
    Ok(())
}

#[test]
fn test_remove_head_row_clears_flag() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b")], true)?;

    editor.remove_row(table, 0)?;

    assert_eq!(editor.tree().table_shape(table)?, (2, false));
    assert!(editor.to_json()?.contains(r#""needHead":false"#));
    Ok(())
}

#[test]
fn test_row_emptied_in_one_batch_is_removed() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b"), ("c", "d")], false)?;
    let first = item(&editor, table, 0, 0)?;
    let second = item(&editor, table, 0, 1)?;

    editor.delete_ranges(&[(first, 0, Some(1)), (second, 0, Some(1))])?;

    assert_eq!(editor.tree().size(table)?, 1);
    assert_eq!(editor.tree().text(item(&editor, table, 0, 0)?)?, "c");

    // One undo step brings the row back
    editor.undo();
    assert_eq!(editor.tree().size(table)?, 2);
    assert_eq!(editor.tree().text(first)?, "a");
    Ok(())
}

#[test]
fn test_row_emptied_across_edits_is_kept() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b"), ("c", "d")], false)?;
    let first = item(&editor, table, 0, 0)?;
    let second = item(&editor, table, 0, 1)?;

    editor.delete(first, 0, Some(1))?;
    editor.delete(second, 0, Some(1))?;

    assert_eq!(editor.tree().size(table)?, 2);
    let row = editor.tree().get_child(table, 0)?.unwrap();
    for cell in editor.tree().children(row)? {
        assert!(editor.tree().cell_is_empty(*cell)?);
    }
    Ok(())
}

#[test]
fn test_emptied_head_row_clears_flag() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b")], true)?;
    let k = item(&editor, table, 0, 0)?;
    let v = item(&editor, table, 0, 1)?;

    editor.delete_ranges(&[(k, 0, Some(1)), (v, 0, Some(1))])?;

    assert_eq!(editor.tree().table_shape(table)?, (2, false));
    assert_eq!(editor.tree().size(table)?, 1);
    Ok(())
}

#[test]
fn test_table_item_keeps_its_type() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("a", "b")], false)?;
    let inner = item(&editor, table, 0, 0)?;
    let before = editor.to_json()?;

    let err = editor.exchange(inner, &ExchangeTarget::Paragraph).unwrap_err();

    assert!(err.is_structural());
    assert_eq!(editor.to_json()?, before);
    Ok(())
}

#[test]
fn test_block_inserted_in_cell_becomes_item() -> anyhow::Result<()> {
    let (mut editor, table) = open(&[("ab", "c")], false)?;
    let inner = item(&editor, table, 0, 0)?;
    let paragraph = RawNode::new("PARAGRAPH")
        .with_children(vec![RawNode::new("CHARACTER").with_content("x")]);

    let op = editor.insert_block(inner, Some(1), &paragraph)?;

    let row = editor.tree().get_child(table, 0)?.unwrap();
    let cell = editor.tree().get_child(row, 0)?.unwrap();
    assert_eq!(editor.tree().size(cell)?, 3);
    for id in &op.affected {
        assert_eq!(editor.tree().kind(*id)?, &ComponentKind::TableItem);
    }
    assert_eq!(editor.tree().text(inner)?, "a");

    // Non-content blocks are filtered out
    let media = RawNode::new("MEDIA");
    let op = editor.insert_block(inner, None, &media)?;
    assert_eq!(op.affected, vec![inner]);
    assert_eq!(editor.tree().size(cell)?, 3);
    Ok(())
}

#[test]
fn test_backspace_between_items_of_one_cell() -> anyhow::Result<()> {
    let doc = r#"{"type":"ARTICLE","children":[
        {"type":"PARAGRAPH","children":[{"type":"CHARACTER","content":"keep"}]},
        {"type":"TABLE","col":1,"needHead":false,"children":[
            {"type":"TABLE_ROW","cellType":"td","children":[
                {"type":"TABLE_CELL","cellType":"td","children":[
                    {"type":"TABLE_ITEM","children":[]},
                    {"type":"TABLE_ITEM","children":[{"type":"CHARACTER","content":"x"}]}
                ]}
            ]}
        ]}
    ]}"#;
    let mut editor = Editor::from_json(EditorConfig::default(), doc)?;
    let root = editor.root();
    let table = editor.tree().get_child(root, 1)?.unwrap();
    let row = editor.tree().get_child(table, 0)?.unwrap();
    let cell = editor.tree().get_child(row, 0)?.unwrap();
    let first = editor.tree().get_child(cell, 0)?.unwrap();
    let second = editor.tree().get_child(cell, 1)?.unwrap();

    let op = editor.delete(second, -1, Some(0))?;

    assert_eq!(editor.tree().size(root)?, 2);
    assert_eq!(editor.tree().children(cell)?, &[first]);
    assert_eq!(editor.tree().text(first)?, "x");
    assert_eq!(op.anchor, Some(zebra_editor::Cursor::new(first, 0)));
    Ok(())
}
