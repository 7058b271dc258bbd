use std::ops::{Deref, DerefMut};

use glam::Mat4;

use crate::target::TargetId;
use crate::MaterialId;

// ---------------------------------------------------------------------------
// Command — one recorded GPU operation
// ---------------------------------------------------------------------------

/// A material and the index of the shader pass to draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialPass {
    pub material: MaterialId,
    pub pass: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFloat { material: MaterialId, name: &'static str, value: f32 },
    SetInt { material: MaterialId, name: &'static str, value: i32 },
    SetMatrix { material: MaterialId, name: &'static str, value: Mat4 },
    /// Copy `source` into `destination`, through a material pass if given.
    Blit { source: TargetId, destination: TargetId, material: Option<MaterialPass> },
}

impl Command {
    pub fn is_parameter(&self) -> bool {
        matches!(
            self,
            Command::SetFloat { .. } | Command::SetInt { .. } | Command::SetMatrix { .. }
        )
    }

    pub fn is_blit(&self) -> bool {
        matches!(self, Command::Blit { .. })
    }
}

// ---------------------------------------------------------------------------
// CommandBuffer
// ---------------------------------------------------------------------------

/// Ordered list of commands submitted to the render context as one batch.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    pub name: String,
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), commands: Vec::new() }
    }

    pub fn set_float(&mut self, material: MaterialId, name: &'static str, value: f32) {
        self.commands.push(Command::SetFloat { material, name, value });
    }

    pub fn set_int(&mut self, material: MaterialId, name: &'static str, value: i32) {
        self.commands.push(Command::SetInt { material, name, value });
    }

    pub fn set_matrix(&mut self, material: MaterialId, name: &'static str, value: Mat4) {
        self.commands.push(Command::SetMatrix { material, name, value });
    }

    /// Plain copy, no material.
    pub fn blit(&mut self, source: TargetId, destination: TargetId) {
        self.commands.push(Command::Blit { source, destination, material: None });
    }

    pub fn blit_with_material(
        &mut self,
        source: TargetId,
        destination: TargetId,
        material: MaterialId,
        pass: u32,
    ) {
        self.commands.push(Command::Blit {
            source,
            destination,
            material: Some(MaterialPass { material, pass }),
        });
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

// ---------------------------------------------------------------------------
// CommandBufferPool — explicit acquire / release
// ---------------------------------------------------------------------------

/// Recycles command buffers so the per-frame command vectors keep their
/// capacity across frames.
#[derive(Debug, Default)]
pub struct CommandBufferPool {
    free: Vec<CommandBuffer>,
}

impl CommandBufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a cleared buffer from the pool (or a new one) named `name`.
    pub fn get(&mut self, name: &str) -> CommandBuffer {
        match self.free.pop() {
            Some(mut buffer) => {
                buffer.clear();
                buffer.name.clear();
                buffer.name.push_str(name);
                buffer
            }
            None => CommandBuffer::new(name),
        }
    }

    pub fn release(&mut self, buffer: CommandBuffer) {
        self.free.push(buffer);
    }

    /// Number of buffers waiting to be reused.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Acquire a buffer that goes back to this pool when the guard drops.
    pub fn scoped(&mut self, name: &str) -> PooledCommandBuffer<'_> {
        let buffer = self.get(name);
        PooledCommandBuffer { pool: self, buffer: Some(buffer) }
    }
}

/// A command buffer on loan from a [`CommandBufferPool`].
pub struct PooledCommandBuffer<'p> {
    pool: &'p mut CommandBufferPool,
    buffer: Option<CommandBuffer>,
}

impl Deref for PooledCommandBuffer<'_> {
    type Target = CommandBuffer;

    fn deref(&self) -> &CommandBuffer {
        // Only `drop` takes the buffer out.
        self.buffer.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledCommandBuffer<'_> {
    fn deref_mut(&mut self) -> &mut CommandBuffer {
        self.buffer.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledCommandBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release(buffer);
        }
    }
}

// ---------------------------------------------------------------------------
// RenderContext — collects the frame's submitted batches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedBatch {
    pub name: String,
    pub commands: Vec<Command>,
}

/// Per-frame submission queue. Backends drain it with [`submit`](Self::submit)
/// and replay the batches in order.
#[derive(Debug, Default)]
pub struct RenderContext {
    batches: Vec<SubmittedBatch>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a copy of `buffer`'s commands as one batch.
    pub fn execute_command_buffer(&mut self, buffer: &CommandBuffer) {
        log::trace!("submit '{}' ({} commands)", buffer.name, buffer.len());
        self.batches.push(SubmittedBatch {
            name: buffer.name.clone(),
            commands: buffer.commands().to_vec(),
        });
    }

    pub fn batches(&self) -> &[SubmittedBatch] {
        &self.batches
    }

    /// Every queued command, across batches, in submission order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.batches.iter().flat_map(|b| b.commands.iter())
    }

    /// Hand the queued batches to the backend, leaving the context empty.
    pub fn submit(&mut self) -> Vec<SubmittedBatch> {
        std::mem::take(&mut self.batches)
    }

    /// Number of queued batches; pass it to [`discard_since`](Self::discard_since)
    /// to roll back whatever is queued afterwards.
    pub fn mark(&self) -> usize {
        self.batches.len()
    }

    /// Drop every batch queued after `mark`.
    pub fn discard_since(&mut self, mark: usize) {
        if mark < self.batches.len() {
            log::debug!("discarding {} unsubmitted batches", self.batches.len() - mark);
            self.batches.truncate(mark);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAT: MaterialId = MaterialId(1);
    const A: TargetId = TargetId(10);
    const B: TargetId = TargetId(20);

    #[test]
    fn commands_keep_recording_order() {
        let mut cmd = CommandBuffer::new("test");
        cmd.set_float(MAT, "_A", 1.0);
        cmd.set_int(MAT, "_B", 2);
        cmd.blit(A, B);
        assert_eq!(cmd.len(), 3);
        assert!(cmd.commands()[0].is_parameter());
        assert!(cmd.commands()[1].is_parameter());
        assert!(cmd.commands()[2].is_blit());
    }

    #[test]
    fn blit_with_material_records_pass() {
        let mut cmd = CommandBuffer::new("test");
        cmd.blit_with_material(A, B, MAT, 0);
        assert_eq!(
            cmd.commands()[0],
            Command::Blit {
                source: A,
                destination: B,
                material: Some(MaterialPass { material: MAT, pass: 0 }),
            }
        );
    }

    #[test]
    fn discard_since_drops_only_later_batches() {
        let mut ctx = RenderContext::new();
        ctx.execute_command_buffer(&CommandBuffer::new("kept"));
        let mark = ctx.mark();
        ctx.execute_command_buffer(&CommandBuffer::new("dropped"));
        ctx.execute_command_buffer(&CommandBuffer::new("dropped too"));

        ctx.discard_since(mark);
        let names: Vec<_> = ctx.submit().into_iter().map(|b| b.name).collect();
        assert_eq!(names, ["kept"]);

        // A stale mark past the end is harmless.
        ctx.discard_since(5);
        assert!(ctx.batches().is_empty());
    }

    #[test]
    fn pool_reuses_released_buffers() {
        let mut pool = CommandBufferPool::new();
        let mut cmd = pool.get("first");
        cmd.blit(A, B);
        pool.release(cmd);
        assert_eq!(pool.available(), 1);

        let cmd = pool.get("second");
        assert_eq!(pool.available(), 0);
        assert_eq!(cmd.name, "second");
        assert!(cmd.is_empty(), "reused buffer must come back cleared");
    }

    #[test]
    fn scoped_buffer_returns_on_drop() {
        let mut pool = CommandBufferPool::new();
        {
            let mut cmd = pool.scoped("scoped");
            cmd.blit(A, A);
            assert_eq!(cmd.len(), 1);
        }
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn context_copies_buffer_contents() {
        let mut ctx = RenderContext::new();
        let mut cmd = CommandBuffer::new("batch");
        cmd.blit(A, B);
        ctx.execute_command_buffer(&cmd);
        cmd.clear();

        assert_eq!(ctx.batches().len(), 1);
        assert_eq!(ctx.batches()[0].name, "batch");
        assert_eq!(ctx.commands().count(), 1);
    }

    #[test]
    fn submit_drains_batches() {
        let mut ctx = RenderContext::new();
        ctx.execute_command_buffer(&CommandBuffer::new("a"));
        ctx.execute_command_buffer(&CommandBuffer::new("b"));
        let batches = ctx.submit();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].name, "a");
        assert!(ctx.batches().is_empty());
    }
}
