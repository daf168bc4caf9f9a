//! The paged owner directory subsystem.
//!
//! An owner directory is a chain of `DirectoryNode` pages holding the
//! keys of the entries an account owns. The root page (page zero) is
//! created lazily on first insert and deleted again when the last key
//! leaves; interior pages unlink and delete themselves when emptied.
//! Inserts return the page number, which entries store as their
//! removal hint.

use alloc::vec;

use crate::constants::DIR_NODE_MAX_ENTRIES;
use crate::core::keylets;
use crate::ledger::exceptions::XRPLLedgerException;
use crate::ledger::view::LedgerView;
use crate::models::ledger::{DirectoryNode, SerializedLedgerEntry};
use crate::models::{AccountId, LedgerKey};

fn read_page(
    view: &dyn LedgerView,
    root: &LedgerKey,
    page: u64,
) -> Result<Option<DirectoryNode>, XRPLLedgerException> {
    match view.read(&keylets::dir_page(root, page)) {
        Some(bytes) => Ok(Some(DirectoryNode::from_bytes(&bytes)?)),
        None => Ok(None),
    }
}

fn write_page(
    view: &mut dyn LedgerView,
    root: &LedgerKey,
    page: u64,
    node: &DirectoryNode,
) -> Result<(), XRPLLedgerException> {
    view.update(&keylets::dir_page(root, page), node.to_bytes())
}

/// Inserts `entry_key` into `owner`'s directory and returns the page
/// it landed on: the first page with free capacity, or a fresh page
/// linked from the tail. Creates the directory root if the directory
/// does not exist yet.
pub fn dir_insert(
    view: &mut dyn LedgerView,
    owner: &AccountId,
    entry_key: &LedgerKey,
) -> Result<u64, XRPLLedgerException> {
    let root = keylets::owner_dir(owner);

    if !view.exists(&root) {
        let node = DirectoryNode {
            flags: 0,
            indexes: vec![*entry_key],
            index_next: None,
            owner: Some(*owner),
            root_index: root,
        };
        view.insert(&root, node.to_bytes())?;

        return Ok(0);
    }

    let mut page = 0;
    loop {
        let mut node = read_page(view, &root, page)?.ok_or(XRPLLedgerException::EntryNotFound)?;

        if node.indexes.len() < DIR_NODE_MAX_ENTRIES {
            node.indexes.push(*entry_key);
            write_page(view, &root, page, &node)?;

            return Ok(page);
        }

        match node.index_next {
            Some(next) => page = next,
            None => {
                // Pages are allocated in increasing order, so the tail
                // number plus one is never a live page.
                let new_page = page + 1;
                node.index_next = Some(new_page);
                write_page(view, &root, page, &node)?;

                let fresh = DirectoryNode {
                    flags: 0,
                    indexes: vec![*entry_key],
                    index_next: None,
                    owner: None,
                    root_index: root,
                };
                view.insert(&keylets::dir_page(&root, new_page), fresh.to_bytes())?;

                return Ok(new_page);
            }
        }
    }
}

/// Removes `entry_key` from `owner`'s directory, looking at
/// `page_hint` first and falling back to a scan from the head.
/// Returns whether the key was found; removal of an absent key is not
/// an error. Emptied interior pages are unlinked and deleted; with
/// `prune_empty_root` the root page is deleted too once the directory
/// holds nothing.
pub fn dir_remove(
    view: &mut dyn LedgerView,
    owner: &AccountId,
    page_hint: u64,
    entry_key: &LedgerKey,
    prune_empty_root: bool,
) -> Result<bool, XRPLLedgerException> {
    let root = keylets::owner_dir(owner);

    let page = match find_entry(view, &root, page_hint, entry_key)? {
        Some(page) => page,
        None => return Ok(false),
    };

    let mut node = read_page(view, &root, page)?.ok_or(XRPLLedgerException::EntryNotFound)?;
    node.indexes.retain(|key| key != entry_key);

    if !node.indexes.is_empty() {
        write_page(view, &root, page, &node)?;

        return Ok(true);
    }

    if page == 0 {
        if node.index_next.is_none() && prune_empty_root {
            view.erase(&root)?;
        } else {
            write_page(view, &root, page, &node)?;
        }

        return Ok(true);
    }

    // Unlink the emptied page from its predecessor and delete it.
    let (pred_page, mut pred) = find_predecessor(view, &root, page)?;
    pred.index_next = node.index_next;
    write_page(view, &root, pred_page, &pred)?;
    view.erase(&keylets::dir_page(&root, page))?;

    // The unlink may leave a childless, empty root behind.
    if prune_empty_root {
        if let Some(head) = read_page(view, &root, 0)? {
            if head.indexes.is_empty() && head.index_next.is_none() {
                view.erase(&root)?;
            }
        }
    }

    Ok(true)
}

/// Locates the page holding `entry_key`, trying `page_hint` before
/// walking the chain from the head.
fn find_entry(
    view: &dyn LedgerView,
    root: &LedgerKey,
    page_hint: u64,
    entry_key: &LedgerKey,
) -> Result<Option<u64>, XRPLLedgerException> {
    if let Some(node) = read_page(view, root, page_hint)? {
        if node.indexes.contains(entry_key) {
            return Ok(Some(page_hint));
        }
    }

    let mut page = 0;
    loop {
        let node = match read_page(view, root, page)? {
            Some(node) => node,
            None => return Ok(None),
        };

        if node.indexes.contains(entry_key) {
            return Ok(Some(page));
        }

        match node.index_next {
            Some(next) => page = next,
            None => return Ok(None),
        }
    }
}

fn find_predecessor(
    view: &dyn LedgerView,
    root: &LedgerKey,
    target: u64,
) -> Result<(u64, DirectoryNode), XRPLLedgerException> {
    let mut page = 0;
    loop {
        let node = read_page(view, root, page)?.ok_or(XRPLLedgerException::EntryNotFound)?;

        match node.index_next {
            Some(next) if next == target => return Ok((page, node)),
            Some(next) => page = next,
            None => return Err(XRPLLedgerException::EntryNotFound),
        }
    }
}
