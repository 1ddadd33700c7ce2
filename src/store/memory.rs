// ABOUTME: In-memory store implementations backed by RwLock-guarded maps
// ABOUTME: Used by tests and in-process embeddings that need no database

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{Execution, TaskLog, Workflow};

use super::{ExecutionStore, Result, StoreError, TaskLogStore, WorkflowStore};

#[derive(Default)]
pub struct InMemoryWorkflowStore {
    rows: RwLock<HashMap<Uuid, Workflow>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn create(&self, workflow: &Workflow) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows
            .values()
            .any(|existing| existing.name == workflow.name)
        {
            return Err(StoreError::DuplicateName {
                name: workflow.name.clone(),
            });
        }
        rows.insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Workflow> {
        let rows = self.rows.read().await;
        rows.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "workflow",
            id,
        })
    }

    async fn get_by_name(&self, name: &str) -> Result<Workflow> {
        let rows = self.rows.read().await;
        rows.values()
            .find(|workflow| workflow.name == name)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "workflow",
                id: Uuid::nil(),
            })
    }

    async fn list_all(&self) -> Result<Vec<Workflow>> {
        let rows = self.rows.read().await;
        let mut workflows: Vec<Workflow> = rows.values().cloned().collect();
        workflows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(workflows)
    }

    async fn update(&self, workflow: &Workflow) -> Result<()> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&workflow.id) {
            return Err(StoreError::NotFound {
                entity: "workflow",
                id: workflow.id,
            });
        }
        if rows
            .values()
            .any(|existing| existing.id != workflow.id && existing.name == workflow.name)
        {
            return Err(StoreError::DuplicateName {
                name: workflow.name.clone(),
            });
        }
        rows.insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut rows = self.rows.write().await;
        rows.remove(&id).ok_or(StoreError::NotFound {
            entity: "workflow",
            id,
        })?;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryExecutionStore {
    rows: RwLock<HashMap<Uuid, Execution>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn create(&self, execution: &Execution) -> Result<()> {
        let mut rows = self.rows.write().await;
        rows.insert(execution.id, execution.clone());
        Ok(())
    }

    async fn update(&self, execution: &Execution) -> Result<()> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&execution.id) {
            return Err(StoreError::NotFound {
                entity: "execution",
                id: execution.id,
            });
        }
        rows.insert(execution.id, execution.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Execution> {
        let rows = self.rows.read().await;
        rows.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "execution",
            id,
        })
    }

    async fn list_by_workflow(&self, workflow_id: Uuid) -> Result<Vec<Execution>> {
        let rows = self.rows.read().await;
        let mut executions: Vec<Execution> = rows
            .values()
            .filter(|execution| execution.workflow_id == workflow_id)
            .cloned()
            .collect();
        executions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(executions)
    }

    async fn list_all(&self) -> Result<Vec<Execution>> {
        let rows = self.rows.read().await;
        let mut executions: Vec<Execution> = rows.values().cloned().collect();
        executions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(executions)
    }
}

#[derive(Default)]
pub struct InMemoryTaskLogStore {
    rows: RwLock<HashMap<Uuid, TaskLog>>,
}

impl InMemoryTaskLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskLogStore for InMemoryTaskLogStore {
    async fn create(&self, log: &TaskLog) -> Result<()> {
        let mut rows = self.rows.write().await;
        rows.insert(log.id, log.clone());
        Ok(())
    }

    async fn update(&self, log: &TaskLog) -> Result<()> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&log.id) {
            return Err(StoreError::NotFound {
                entity: "task log",
                id: log.id,
            });
        }
        rows.insert(log.id, log.clone());
        Ok(())
    }

    async fn list_by_execution(&self, execution_id: Uuid) -> Result<Vec<TaskLog>> {
        let rows = self.rows.read().await;
        let mut logs: Vec<TaskLog> = rows
            .values()
            .filter(|log| log.execution_id == execution_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(logs)
    }
}
