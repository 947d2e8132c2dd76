// Copyright 2016 Martin Grabmueller. See the LICENSE file at the
// top-level directory of this distribution for license information.

//! PPM context model.
//!
//! The model is a tree of contexts.  The root is the order-0
//! context; the child of a context at slot `s` is the context in
//! which `s` preceded the symbols of the parent context.  A path of
//! length `n` from the root therefore stands for the `n` most recent
//! symbols, most recent first.

use std::collections::vec_deque;
use std::collections::VecDeque;

use tracing::trace;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::Symbol;

pub struct Context {
    pub frequencies: FrequencyTable,
    children: Option<Box<[Option<Box<Context>>]>>,
}

impl Context {
    fn new(symbol_limit: usize, escape_symbol: Symbol, has_children: bool) -> Result<Context> {
        let mut frequencies = FrequencyTable::adaptive(symbol_limit);
        frequencies.increment(escape_symbol)?;
        let children = if has_children {
            let mut slots = Vec::with_capacity(symbol_limit);
            slots.resize_with(symbol_limit, || None);
            Some(slots.into_boxed_slice())
        } else {
            None
        };
        Ok(Context {
            frequencies,
            children,
        })
    }

    /// Return the child context for `symbol`, if it exists.
    pub fn child(&self, symbol: Symbol) -> Option<&Context> {
        self.children
            .as_ref()
            .and_then(|c| c.get(symbol))
            .and_then(|slot| slot.as_deref())
    }
}

/// The most recent symbols, most recent first.
#[derive(Debug, Clone)]
pub struct History {
    symbols: VecDeque<Symbol>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> History {
        History {
            symbols: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    /// Record `symbol` as the most recent one, dropping the oldest
    /// symbol when the history is full.
    pub fn push(&mut self, symbol: Symbol) {
        if self.capacity == 0 {
            return;
        }
        if self.symbols.len() == self.capacity {
            self.symbols.pop_back();
        }
        self.symbols.push_front(symbol);
    }
}

pub struct PpmModel {
    order: i32,
    symbol_limit: usize,
    escape_symbol: Symbol,
    root: Option<Context>,
    order_minus1: FrequencyTable,
    contexts: usize,
}

impl PpmModel {
    pub fn new(config: &Config) -> Result<PpmModel> {
        config.validate()?;
        let root = if config.order >= 0 {
            Some(Context::new(
                config.symbol_limit,
                config.escape_symbol,
                config.order >= 1,
            )?)
        } else {
            None
        };
        Ok(PpmModel {
            order: config.order,
            symbol_limit: config.symbol_limit,
            escape_symbol: config.escape_symbol,
            contexts: if root.is_some() { 1 } else { 0 },
            root,
            order_minus1: FrequencyTable::flat(config.symbol_limit),
        })
    }

    pub fn escape_symbol(&self) -> Symbol {
        self.escape_symbol
    }

    /// The order -1 table, in which every symbol has count one.
    pub fn order_minus1(&self) -> &FrequencyTable {
        &self.order_minus1
    }

    /// Number of contexts allocated so far.
    pub fn context_count(&self) -> usize {
        self.contexts
    }

    /// Follow the context chain for `path` (most recent symbol first)
    /// starting at the root.  Returns `None` if the model is disabled
    /// or some context on the way has not been created yet.
    pub fn context<'a, I>(&self, path: I) -> Option<&Context>
    where
        I: IntoIterator<Item = &'a Symbol>,
    {
        let mut ctx = self.root.as_ref()?;
        for &sym in path {
            ctx = ctx.child(sym)?;
        }
        Some(ctx)
    }

    /// Count `symbol` in the root context and in every context on the
    /// path given by `history`, creating missing contexts.  Encoder
    /// and decoder must call this with the same arguments after every
    /// symbol.
    pub fn increment_contexts(&mut self, history: &History, symbol: Symbol) -> Result<()> {
        let root = match self.root.as_mut() {
            Some(root) => root,
            None => return Ok(()),
        };
        if symbol >= self.symbol_limit {
            return Err(Error::SymbolOutOfRange {
                symbol,
                limit: self.symbol_limit,
            });
        }
        let max_depth = self.order as usize;
        if history.len() > max_depth {
            return Err(Error::HistoryTooLong {
                len: history.len(),
                order: self.order,
            });
        }

        let mut ctx = root;
        ctx.frequencies.increment(symbol)?;
        for (depth, &sym) in history.iter().enumerate() {
            let children = match ctx.children.as_mut() {
                Some(children) => children,
                None => break,
            };
            let slot = children.get_mut(sym).ok_or(Error::SymbolOutOfRange {
                symbol: sym,
                limit: self.symbol_limit,
            })?;
            if slot.is_none() {
                trace!(depth = depth + 1, symbol = sym, "new context");
                let child = Context::new(
                    self.symbol_limit,
                    self.escape_symbol,
                    depth + 1 < max_depth,
                )?;
                *slot = Some(Box::new(child));
                self.contexts += 1;
            }
            ctx = match slot.as_deref_mut() {
                Some(child) => child,
                None => break,
            };
            ctx.frequencies.increment(symbol)?;
        }
        Ok(())
    }

    /// Length of the longest context chain below the root.
    pub fn depth(&self) -> usize {
        let root = match self.root.as_ref() {
            Some(root) => root,
            None => return 0,
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 0)];
        while let Some((ctx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(children) = ctx.children.as_ref() {
                for child in children.iter().flatten() {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }
}
