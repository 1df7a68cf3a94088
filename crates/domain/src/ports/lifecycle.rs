/// 宿主进程保活钩子，调度循环启动时 acquire，停止时 release
pub trait LifecycleGuard: Send + Sync {
    fn acquire(&self);
    fn release(&self);
}
