//! Runner の結合テスト（送信はスタブ、ログはメモリに溜める）
