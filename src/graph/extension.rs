//! 图扩展机制: 在任意图对象上挂载具名的附加数据, 并在结构变化时通知监听器.
//!
//! 监听器回调返回 `false` 即被立即注销, 单次监听器是最常见的用法.
//! [`StructuralExtensionRemover`] 借此实现缓存失效: 第一次结构变化时删除
//! 指定的扩展并注销自身.
//!
//! 该机制只面向单线程使用, 扩展值以 [`Rc`] 共享.
use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// 结构变化 (增删节点或边) 之后运行的回调.
///
/// 回调拿到的是图的扩展存储 [`GraphExtensions`], 而不是图本身: 它可以增删扩展
/// 和监听器, 但看不到也改不了图的结构.
pub trait StructureListener {
    /// 返回 `false` 表示注销本监听器.
    fn structure_changed(&self, graph: &mut GraphExtensions) -> bool;

    /// 若本监听器负责在结构变化时删除某个扩展, 返回该扩展的键.
    fn removes_extension(&self) -> Option<&str> {
        None
    }
}

impl<F> StructureListener for F
where
    F: Fn(&mut GraphExtensions) -> bool,
{
    fn structure_changed(&self, graph: &mut GraphExtensions) -> bool {
        self(graph)
    }
}

pub type Listener = Rc<dyn StructureListener>;

fn same_listener(left: &Listener, right: &Listener) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
}

/// 第一次结构变化时删除扩展 `key`, 随后注销自身.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralExtensionRemover {
    key: String,
}

impl StructuralExtensionRemover {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl StructureListener for StructuralExtensionRemover {
    fn structure_changed(&self, graph: &mut GraphExtensions) -> bool {
        if graph.remove_extension(&self.key).is_some() {
            log::debug!("structural change invalidated extension `{}`", self.key);
        }
        false
    }

    fn removes_extension(&self) -> Option<&str> {
        Some(&self.key)
    }
}

/// 一个图的具名扩展与结构监听器.
///
/// 克隆得到的是空存储: 缓存在图上的派生数据不随结构副本复制.
#[derive(Default)]
pub struct GraphExtensions {
    extensions: IndexMap<String, Rc<dyn Any>>,
    listeners: Vec<Listener>,
}

impl GraphExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 `key` 存入 `value`, 返回被替换的旧值.
    pub fn put_extension<T: Any>(
        &mut self,
        key: impl Into<String>,
        value: Rc<T>,
    ) -> Option<Rc<dyn Any>> {
        self.extensions.insert(key.into(), value)
    }

    /// 取 `key` 下类型为 `T` 的扩展.
    pub fn extension<T: Any>(&self, key: &str) -> Option<Rc<T>> {
        let value = self.extensions.get(key)?;
        Rc::clone(value).downcast::<T>().ok()
    }

    pub fn has_extension(&self, key: &str) -> bool {
        self.extensions.contains_key(key)
    }

    pub fn remove_extension(&mut self, key: &str) -> Option<Rc<dyn Any>> {
        self.extensions.shift_remove(key)
    }

    pub fn extension_keys(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }

    /// 同一个监听器已注册时返回 `false`.
    pub fn add_listener(&mut self, listener: Listener) -> bool {
        if self.has_listener(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    pub fn remove_listener(&mut self, listener: &Listener) -> bool {
        let before = self.listeners.len();
        self.listeners
            .retain(|registered| !same_listener(registered, listener));
        before != self.listeners.len()
    }

    pub fn has_listener(&self, listener: &Listener) -> bool {
        self.listeners
            .iter()
            .any(|registered| same_listener(registered, listener))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// 是否已有监听器负责删除扩展 `key`.
    pub fn has_remover_for(&self, key: &str) -> bool {
        self.listeners
            .iter()
            .any(|listener| listener.removes_extension() == Some(key))
    }

    /// 依次运行每个已注册的监听器, 注销返回 `false` 的监听器.
    ///
    /// 遍历的是快照: 回调中新加的监听器从下一次变化起生效, 回调中被移除的监听器不再运行.
    pub fn invoke_listeners(&mut self) {
        let snapshot = self.listeners.clone();
        for listener in snapshot {
            if !self.has_listener(&listener) {
                continue;
            }
            if !listener.structure_changed(self) {
                self.remove_listener(&listener);
            }
        }
    }
}

impl Clone for GraphExtensions {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for GraphExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphExtensions")
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// 持有 [`GraphExtensions`] 的图.
pub trait Extensible {
    fn extensions(&self) -> &GraphExtensions;

    fn extensions_mut(&mut self) -> &mut GraphExtensions;

    fn put_extension<T: Any>(&mut self, key: impl Into<String>, value: Rc<T>) {
        self.extensions_mut().put_extension(key, value);
    }

    fn get_extension<T: Any>(&self, key: &str) -> Option<Rc<T>> {
        self.extensions().extension(key)
    }

    fn has_extension(&self, key: &str) -> bool {
        self.extensions().has_extension(key)
    }

    fn remove_extension(&mut self, key: &str) -> bool {
        self.extensions_mut().remove_extension(key).is_some()
    }

    fn add_listener(&mut self, listener: Listener) -> bool {
        self.extensions_mut().add_listener(listener)
    }

    fn remove_listener(&mut self, listener: &Listener) -> bool {
        self.extensions_mut().remove_listener(listener)
    }
}
