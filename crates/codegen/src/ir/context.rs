use std::collections::{HashSet, VecDeque};

use super::resolve::Resolver;
use super::types::RustType;
use crate::error::GenerateError;
use crate::spec::{OpenApiSpec, Schema};

/// Shared state for one generation run.
///
/// Tracks the set of identifiers the output must declare. Anything resolved
/// through [`resolve_wanted`](Self::resolve_wanted) marks its dependencies,
/// and the closure pass drains [`next_wanted`](Self::next_wanted) until no
/// new identifiers appear.
#[derive(Debug)]
pub struct GenerationContext<'a> {
    spec: &'a OpenApiSpec,
    resolver: Resolver<'a>,
    wanted: HashSet<String>,
    queue: VecDeque<String>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Result<Self, GenerateError> {
        Ok(Self {
            spec,
            resolver: Resolver::new(spec)?,
            wanted: HashSet::new(),
            queue: VecDeque::new(),
        })
    }

    pub fn spec(&self) -> &'a OpenApiSpec {
        self.spec
    }

    pub fn resolver(&mut self) -> &mut Resolver<'a> {
        &mut self.resolver
    }

    /// Resolves a schema and marks every identifier it mentions.
    pub fn resolve_wanted(&mut self, schema: &Schema, context: &str) -> Result<RustType, GenerateError> {
        let ty = self.resolver.resolve(schema, context)?;
        self.require(&ty);
        Ok(ty)
    }

    pub fn require(&mut self, ty: &RustType) {
        for ident in ty.dependencies() {
            self.want(ident);
        }
    }

    pub fn want(&mut self, ident: &str) {
        if self.wanted.insert(ident.to_string()) {
            self.queue.push_back(ident.to_string());
        }
    }

    pub fn next_wanted(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    pub fn is_wanted(&self, ident: &str) -> bool {
        self.wanted.contains(ident)
    }
}
