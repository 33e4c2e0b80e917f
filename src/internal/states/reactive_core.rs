//! # ReactiveProperty：响应式属性内核
//!
//! 下载进度与任务状态都通过本模块对外广播。
//! 底层是 [`tokio::sync::watch`]：写端永不阻塞，读端只保留最新值，
//! 慢速监听者不会拖住上报进度的分片任务。

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::sync::watch::error::RecvError;

// ──────────────────────────── Error ────────────────────────────

/// 响应式属性统一错误类型
#[derive(Debug, Error)]
pub enum ReactivePropertyError {
    /// 属性中没有值
    #[error("属性已被销毁")]
    WatcherClosed,

    /// watch 通道接收失败
    #[error("接收失败: {0}")]
    RecvError(#[from] RecvError),
}

// ──────────────────────────── Inner ────────────────────────────

/// 所有句柄共享的发送端。
///
/// 最后一个句柄销毁时发送端随之销毁，监听器先收到尚未读取的最新值，再收到通道关闭。
#[derive(Debug)]
pub(crate) struct Inner<T> {
    pub(crate) sender: watch::Sender<Option<T>>,
}

// ──────────────────────────── ReactiveProperty ────────────────────────────

/// 响应式属性内核：new / update / update_field / get_current / watch。
#[derive(Clone, Debug)]
pub struct ReactiveProperty<T: Clone + Send + Sync> {
    pub(crate) inner: Arc<Inner<T>>,
    pub(crate) cache_receiver: watch::Receiver<Option<T>>,
}

impl<T> ReactiveProperty<T>
where
    T: Clone + Send + Sync,
{
    /// 创建一个新的响应式属性。
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(Some(value));
        let cache_receiver = sender.subscribe();
        Self {
            inner: Arc::new(Inner { sender }),
            cache_receiver,
        }
    }

    /// 整体替换属性值，所有监听者都会收到通知。
    pub fn update(&self, new_value: T) -> &Self {
        // 没有任何 receiver 时 send 会失败，但值依然写入
        self.inner.sender.send_replace(Some(new_value));
        self
    }

    /// 在通道锁内原地修改当前值并通知监听者，返回闭包的结果。
    ///
    /// 多个任务并发调用时，每次「读-改-写」都是串行的，不会丢失更新。
    pub fn update_field<F, R>(&self, updater: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut result = None;
        self.inner.sender.send_modify(|slot| {
            if let Some(value) = slot.as_mut() {
                result = Some(updater(value));
            }
        });
        result
    }

    /// 获取当前属性值的快照（会 clone）。
    pub fn get_current(&self) -> Option<T> {
        self.cache_receiver.borrow().as_ref().cloned()
    }

    /// 获取当前值，属性已销毁时返回默认值。
    pub fn get_or_default(&self) -> T
    where
        T: Default,
    {
        self.get_current().unwrap_or_default()
    }

    /// 创建一个监听器，用于异步监听属性值的变化。
    pub fn watch(&self) -> PropertyWatcher<T> {
        PropertyWatcher {
            receiver: self.inner.sender.subscribe(),
        }
    }
}

// ──────────────────────────── PropertyWatcher ────────────────────────────

/// 属性监听器，用于异步接收属性值的变化。
///
/// 只保证拿到最新值：两次 `changed()` 之间的中间值可能被合并。
/// 监听器不持有属性本身，属性的所有句柄销毁后 `changed()` 返回错误。
pub struct PropertyWatcher<T> {
    receiver: watch::Receiver<Option<T>>,
}

impl<T> PropertyWatcher<T>
where
    T: Clone + Send + Sync,
{
    /// 异步等待属性值的变化，返回新值。
    pub async fn changed(&mut self) -> Result<T, ReactivePropertyError> {
        self.receiver.changed().await?;
        match self.receiver.borrow_and_update().as_ref() {
            None => Err(ReactivePropertyError::WatcherClosed),
            Some(value) => Ok(value.clone()),
        }
    }

    /// 同步获取当前值的克隆。
    pub fn borrow(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }
}
