//! # Builder Contract
//!
//! Rendering is delegated to a [`Builder`]: one method per variant, each
//! receiving the component's external id, a lazy producer of its rendered
//! children and its decoration. The engine never inspects `Output`.

use crate::component::{CellType, ComponentId, ComponentKind, HeaderType, ListType, MediaType};
use crate::content::ContentRun;
use crate::decorate::StoreData;
use crate::errors::EditorResult;
use crate::tree::ComponentTree;
use serde_json::Value;
use std::cell::RefCell;

/// Renders the children of the component being built each time it is
/// called; a builder that never calls it skips the subtree
pub type Children<'a, T> = &'a dyn Fn() -> Vec<T>;

/// How a list item is laid out inside its list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListItemKind {
    /// A content block becomes a plain list item
    Content,
    /// A nested list sits inside an unmarked item
    Nested,
}

pub trait Builder {
    /// Rendered node
    type Output;

    fn build_article(
        &self,
        id: &str,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_customer_collection(
        &self,
        id: &str,
        tag: &str,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_table(
        &self,
        id: &str,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_table_row(
        &self,
        id: &str,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_table_cell(
        &self,
        id: &str,
        cell_type: CellType,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_list(
        &self,
        id: &str,
        list_type: ListType,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_list_item(&self, item: Self::Output, kind: ListItemKind) -> Self::Output;

    fn build_paragraph(
        &self,
        id: &str,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_header(
        &self,
        id: &str,
        header_type: HeaderType,
        children: Children<'_, Self::Output>,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_code_block(
        &self,
        id: &str,
        content: &str,
        language: &str,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_image(&self, id: &str, src: &str, style: &StoreData, data: &StoreData)
        -> Self::Output;

    fn build_audio(&self, id: &str, src: &str, style: &StoreData, data: &StoreData)
        -> Self::Output;

    fn build_video(&self, id: &str, src: &str, style: &StoreData, data: &StoreData)
        -> Self::Output;

    /// One run of characters sharing a decorate
    fn build_character_list(
        &self,
        id: &str,
        text: &str,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;

    fn build_inline_image(
        &self,
        id: &str,
        src: &str,
        style: &StoreData,
        data: &StoreData,
    ) -> Self::Output;
}

/// Render a component and its subtree through `builder`
pub fn render<B: Builder>(
    tree: &ComponentTree,
    id: ComponentId,
    builder: &B,
) -> EditorResult<B::Output> {
    let node = tree.get(id)?;
    let external = tree.qualified_id(id);
    let style = node.decorate().style();
    let data = node.decorate().data();

    let output = match node.kind() {
        ComponentKind::Article => lazy(
            || render_children(tree, id, builder),
            |children| builder.build_article(&external, children, style, data),
        )?,
        ComponentKind::Custom { tag } => lazy(
            || render_children(tree, id, builder),
            |children| {
                builder.build_customer_collection(&external, tag, children, style, data)
            },
        )?,
        ComponentKind::Table { .. } => lazy(
            || render_children(tree, id, builder),
            |children| builder.build_table(&external, children, style, data),
        )?,
        ComponentKind::TableRow(_) => lazy(
            || render_children(tree, id, builder),
            |children| builder.build_table_row(&external, children, style, data),
        )?,
        ComponentKind::TableCell(cell_type) => lazy(
            || render_children(tree, id, builder),
            |children| builder.build_table_cell(&external, *cell_type, children, style, data),
        )?,
        ComponentKind::List(list_type) => lazy(
            || render_list_items(tree, id, builder),
            |children| builder.build_list(&external, *list_type, children, style, data),
        )?,
        ComponentKind::Paragraph => lazy(
            || render_content(tree, id, builder),
            |children| builder.build_paragraph(&external, children, style, data),
        )?,
        ComponentKind::TableItem => {
            let mut data = data.clone();
            data.insert("tag".to_string(), Value::String("p".to_string()));
            lazy(
                || render_content(tree, id, builder),
                |children| builder.build_paragraph(&external, children, style, &data),
            )?
        }
        ComponentKind::Header(header_type) => lazy(
            || render_content(tree, id, builder),
            |children| builder.build_header(&external, *header_type, children, style, data),
        )?,
        ComponentKind::CodeBlock { language } => {
            let content = tree.text(id)?;
            builder.build_code_block(&external, &content, language, style, data)
        }
        ComponentKind::Media { media_type, src } => match media_type {
            MediaType::Image => builder.build_image(&external, src, style, data),
            MediaType::Audio => builder.build_audio(&external, src, style, data),
            MediaType::Video => builder.build_video(&external, src, style, data),
        },
        ComponentKind::Character(c) => {
            builder.build_character_list(&external, &c.to_string(), style, data)
        }
        ComponentKind::InlineImage { src } => {
            builder.build_inline_image(&external, src, style, data)
        }
    };
    Ok(output)
}

/// Hand `build` a producer that renders children only when called.
///
/// The first failure while producing is returned once `build` finishes.
fn lazy<T>(
    produce: impl Fn() -> EditorResult<Vec<T>>,
    build: impl FnOnce(Children<'_, T>) -> T,
) -> EditorResult<T> {
    let failure = RefCell::new(None);
    let children = || match produce() {
        Ok(children) => children,
        Err(e) => {
            let mut slot = failure.borrow_mut();
            if slot.is_none() {
                *slot = Some(e);
            }
            Vec::new()
        }
    };

    let output = build(&children);
    match failure.into_inner() {
        Some(e) => Err(e),
        None => Ok(output),
    }
}

fn render_list_items<B: Builder>(
    tree: &ComponentTree,
    id: ComponentId,
    builder: &B,
) -> EditorResult<Vec<B::Output>> {
    let mut items = Vec::new();
    for child in tree.children(id)? {
        let kind = match tree.kind(*child)? {
            ComponentKind::List(_) => ListItemKind::Nested,
            _ => ListItemKind::Content,
        };
        items.push(builder.build_list_item(render(tree, *child, builder)?, kind));
    }
    Ok(items)
}

fn render_children<B: Builder>(
    tree: &ComponentTree,
    id: ComponentId,
    builder: &B,
) -> EditorResult<Vec<B::Output>> {
    tree.children(id)?
        .iter()
        .map(|child| render(tree, *child, builder))
        .collect()
}

/// Content children rendered as coalesced runs
fn render_content<B: Builder>(
    tree: &ComponentTree,
    id: ComponentId,
    builder: &B,
) -> EditorResult<Vec<B::Output>> {
    let mut out = Vec::new();
    for (index, run) in tree.format_children(id)?.into_iter().enumerate() {
        match run {
            ContentRun::Text { content, decorate } => {
                let run_id = format!("{}__{}", tree.qualified_id(id), index);
                out.push(builder.build_character_list(
                    &run_id,
                    &content,
                    decorate.style(),
                    decorate.data(),
                ));
            }
            ContentRun::Leaf(leaf) => out.push(render(tree, leaf, builder)?),
        }
    }
    Ok(out)
}
