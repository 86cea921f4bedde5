use std::any::Any;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Runnable, RunnableRef, insert_metadata, lc_id};
use crate::load::{Kwargs, LoadError};

/// Steps piped one into the next, e.g. a prompt followed by a model.
#[derive(Debug, Clone)]
pub struct RunnableSequence {
    pub first: RunnableRef,
    pub middle: Vec<RunnableRef>,
    pub last: RunnableRef,
    pub metadata: Option<Map<String, Value>>,
}

impl RunnableSequence {
    pub fn new(first: RunnableRef, last: RunnableRef) -> Self {
        Self {
            first,
            middle: Vec::new(),
            last,
            metadata: None,
        }
    }

    pub fn steps(&self) -> impl Iterator<Item = &RunnableRef> {
        std::iter::once(&self.first)
            .chain(self.middle.iter())
            .chain(std::iter::once(&self.last))
    }

    /// First step of type `T`, if any.
    pub fn find<T: Runnable>(&self) -> Option<&T> {
        self.steps().find_map(|step| step.downcast_ref::<T>())
    }

    pub(crate) fn construct(mut kwargs: Kwargs) -> Result<RunnableRef, LoadError> {
        Ok(Arc::new(Self {
            first: kwargs.required_object("first")?,
            middle: kwargs.objects("middle")?,
            last: kwargs.required_object("last")?,
            metadata: kwargs.json_map("metadata")?,
        }))
    }
}

impl Runnable for RunnableSequence {
    fn lc_id(&self) -> Vec<String> {
        lc_id(&["langchain", "schema", "runnable", "RunnableSequence"])
    }

    fn lc_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("first".into(), self.first.to_manifest());
        kwargs.insert(
            "middle".into(),
            Value::Array(self.middle.iter().map(|step| step.to_manifest()).collect()),
        );
        kwargs.insert("last".into(), self.last.to_manifest());
        insert_metadata(&mut kwargs, &self.metadata);
        kwargs
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }
}
