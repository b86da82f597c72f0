//! Lexical scope analysis.
//!
//! Resolves every variable reference to the local binding it names, or to a
//! global. Scopes follow Lua: a block opens a scope, `local x = x` sees the
//! outer `x` in its values, `local function f` sees itself, and the
//! condition of `repeat ... until` sees the locals of the loop body.

use std::collections::{BTreeMap, BTreeSet};

use luaform_ast::{NodeId, NodeKind, StructuralError, SyntaxTree};

pub type BindingId = usize;
pub type ScopeId = usize;

/// Where a name is written in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// The name of an `Identifier` expression.
    Identifier,
    /// The n-th name of a `local` statement.
    LocalName(usize),
    LocalFunction,
    /// The n-th parameter of a function body.
    Parameter(usize),
    /// The implicit `self` of a method body. Not written in the source.
    SelfParameter,
    ForVariable,
    /// The n-th name of a generic `for`.
    ForName(usize),
    /// The first name of `function a.b.c()`.
    FunctionBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Site {
    pub node: NodeId,
    pub slot: Slot,
}

impl Site {
    pub const fn new(node: NodeId, slot: Slot) -> Self {
        Self { node, slot }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Local,
    LocalFunction,
    Parameter,
    SelfParameter,
    LoopVariable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub declaration: Site,
    pub scope: ScopeId,
    pub references: Vec<Site>,
}

/// What a reference resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Local(BindingId),
    Global(String),
}

#[derive(Debug, Clone, Default)]
pub struct ScopeAnalysis {
    bindings: Vec<Binding>,
    /// Parent of each scope.
    scopes: Vec<Option<ScopeId>>,
    resolutions: BTreeMap<Site, Resolution>,
    globals: BTreeSet<String>,
    assigned_globals: BTreeSet<String>,
    /// `(later, earlier)` pairs of same-scope bindings with one name.
    redeclarations: Vec<(BindingId, BindingId)>,
}

impl ScopeAnalysis {
    pub fn analyze(tree: &SyntaxTree) -> Self {
        let mut analyzer = Analyzer {
            tree,
            analysis: ScopeAnalysis::default(),
            stack: Vec::new(),
        };
        analyzer.block(tree.root());
        analyzer.analysis
    }

    /// Bindings in declaration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id]
    }

    pub fn resolve(&self, site: Site) -> Option<&Resolution> {
        self.resolutions.get(&site)
    }

    pub fn resolutions(&self) -> impl Iterator<Item = (&Site, &Resolution)> {
        self.resolutions.iter()
    }

    /// Every global name read or written anywhere.
    pub fn globals(&self) -> &BTreeSet<String> {
        &self.globals
    }

    /// Globals that are assigned, either directly (`x = 1`) or through a
    /// field (`x.y = 1`, `function x.y() end`).
    pub fn is_global_assigned(&self, name: &str) -> bool {
        self.assigned_globals.contains(name)
    }

    pub fn redeclarations(&self) -> &[(BindingId, BindingId)] {
        &self.redeclarations
    }

    /// Returns true if `ancestor` is `scope` or encloses it.
    pub fn is_within(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.scopes[id];
        }
        false
    }
}

struct Frame {
    scope: ScopeId,
    visible: Vec<BindingId>,
}

struct Analyzer<'t> {
    tree: &'t SyntaxTree,
    analysis: ScopeAnalysis,
    stack: Vec<Frame>,
}

impl Analyzer<'_> {
    fn push_scope(&mut self) {
        let scope = self.analysis.scopes.len();
        self.analysis
            .scopes
            .push(self.stack.last().map(|frame| frame.scope));
        self.stack.push(Frame {
            scope,
            visible: Vec::new(),
        });
    }

    fn pop_scope(&mut self) {
        self.stack.pop();
    }

    fn lookup(&self, name: &str) -> Option<BindingId> {
        self.stack.iter().rev().find_map(|frame| {
            frame
                .visible
                .iter()
                .rev()
                .copied()
                .find(|&id| self.analysis.bindings[id].name == name)
        })
    }

    fn declare(&mut self, name: &str, kind: BindingKind, declaration: Site) {
        let id = self.analysis.bindings.len();
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let earlier = frame
            .visible
            .iter()
            .copied()
            .find(|&other| self.analysis.bindings[other].name == name);
        if let Some(earlier) = earlier {
            self.analysis.redeclarations.push((id, earlier));
        }
        self.analysis.bindings.push(Binding {
            name: name.to_string(),
            kind,
            declaration,
            scope: frame.scope,
            references: Vec::new(),
        });
        frame.visible.push(id);
    }

    fn reference(&mut self, site: Site, name: &str) -> Resolution {
        let resolution = match self.lookup(name) {
            Some(id) => {
                self.analysis.bindings[id].references.push(site);
                Resolution::Local(id)
            }
            None => {
                self.analysis.globals.insert(name.to_string());
                Resolution::Global(name.to_string())
            }
        };
        self.analysis.resolutions.insert(site, resolution.clone());
        resolution
    }

    fn block(&mut self, id: NodeId) {
        self.push_scope();
        self.statements(id);
        self.pop_scope();
    }

    fn statements(&mut self, block: NodeId) {
        let tree = self.tree;
        for &statement in tree.children(block) {
            self.statement(statement);
        }
    }

    fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        let children = tree.children(id);
        match tree.kind(id) {
            NodeKind::LocalAssign { names } => {
                self.expressions(children);
                for (i, local) in names.iter().enumerate() {
                    self.declare(&local.name, BindingKind::Local, Site::new(id, Slot::LocalName(i)));
                }
            }
            NodeKind::LocalFunction { name } => {
                self.declare(name, BindingKind::LocalFunction, Site::new(id, Slot::LocalFunction));
                self.function_body(children[0], false);
            }
            NodeKind::FunctionDeclaration { name } => {
                let site = Site::new(id, Slot::FunctionBase);
                if let Resolution::Global(global) = self.reference(site, &name.base) {
                    self.analysis.assigned_globals.insert(global);
                }
                self.function_body(children[0], name.method.is_some());
            }
            NodeKind::NumericFor { var } => {
                let (bounds, body) = children.split_at(children.len() - 1);
                self.expressions(bounds);
                self.push_scope();
                self.declare(var, BindingKind::LoopVariable, Site::new(id, Slot::ForVariable));
                self.block(body[0]);
                self.pop_scope();
            }
            NodeKind::GenericFor { names } => {
                let (iterators, body) = children.split_at(children.len() - 1);
                self.expressions(iterators);
                self.push_scope();
                for (i, name) in names.iter().enumerate() {
                    self.declare(name, BindingKind::LoopVariable, Site::new(id, Slot::ForName(i)));
                }
                self.block(body[0]);
                self.pop_scope();
            }
            NodeKind::Repeat => {
                self.push_scope();
                self.statements(children[0]);
                self.expression(children[1]);
                self.pop_scope();
            }
            NodeKind::Assign { .. } | NodeKind::CompoundAssign { .. } => {
                let targets = match tree.kind(id) {
                    NodeKind::Assign { targets } => *targets,
                    _ => 1,
                };
                for &target in &children[..targets] {
                    self.assignment_target(target);
                }
                self.expressions(&children[targets..]);
            }
            _ => {
                for &child in children {
                    if matches!(tree.kind(child), NodeKind::Block) {
                        self.block(child);
                    } else {
                        self.expression(child);
                    }
                }
            }
        }
    }

    fn assignment_target(&mut self, target: NodeId) {
        let tree = self.tree;
        self.expression(target);
        let mut root = target;
        while let Some(&prefix) = tree.children(root).first() {
            root = prefix;
        }
        if let NodeKind::Identifier(name) = tree.kind(root)
            && matches!(
                self.analysis.resolve(Site::new(root, Slot::Identifier)),
                Some(Resolution::Global(_))
            )
        {
            self.analysis.assigned_globals.insert(name.clone());
        }
    }

    fn expressions(&mut self, ids: &[NodeId]) {
        for &id in ids {
            self.expression(id);
        }
    }

    fn expression(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Identifier(name) => {
                self.reference(Site::new(id, Slot::Identifier), name);
            }
            NodeKind::Function => self.function_body(tree.children(id)[0], false),
            _ => {
                for &child in tree.children(id) {
                    self.expression(child);
                }
            }
        }
    }

    fn function_body(&mut self, body: NodeId, is_method: bool) {
        let tree = self.tree;
        let NodeKind::FunctionBody { params, .. } = tree.kind(body) else {
            return;
        };
        self.push_scope();
        if is_method {
            self.declare("self", BindingKind::SelfParameter, Site::new(body, Slot::SelfParameter));
        }
        for (i, param) in params.iter().enumerate() {
            self.declare(param, BindingKind::Parameter, Site::new(body, Slot::Parameter(i)));
        }
        self.block(tree.children(body)[0]);
        self.pop_scope();
    }
}

/// Writes `name` at `site`, keeping everything else about the node.
///
/// Implicit `self` parameters have no written name and cannot be renamed.
pub fn rename_site(tree: &mut SyntaxTree, site: Site, name: &str) -> Result<(), StructuralError> {
    let mut kind = tree.kind(site.node).clone();
    let slot = match (&mut kind, site.slot) {
        (NodeKind::Identifier(current), Slot::Identifier) => Some(current),
        (NodeKind::LocalAssign { names }, Slot::LocalName(i)) => names.get_mut(i).map(|n| &mut n.name),
        (NodeKind::LocalFunction { name }, Slot::LocalFunction) => Some(name),
        (NodeKind::FunctionBody { params, .. }, Slot::Parameter(i)) => params.get_mut(i),
        (NodeKind::NumericFor { var }, Slot::ForVariable) => Some(var),
        (NodeKind::GenericFor { names }, Slot::ForName(i)) => names.get_mut(i),
        (NodeKind::FunctionDeclaration { name }, Slot::FunctionBase) => Some(&mut name.base),
        _ => None,
    };
    let Some(slot) = slot else {
        return Err(StructuralError::layout(
            tree.kind(site.node).name(),
            format!("no name to rename at {:?}", site.slot),
        ));
    };
    *slot = name.to_string();
    tree.set_kind(site.node, kind)
}
