//! Shared test fixtures for SSDP, device description and SOAP payloads.

/// M-SEARCH answer from a minidlna server.
pub const SSDP_MEDIA_SERVER_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
CACHE-CONTROL: max-age=1810\r\n\
DATE: Sat, 03 Jan 2026 10:12:44 GMT\r\n\
ST: urn:schemas-upnp-org:device:MediaServer:1\r\n\
USN: uuid:4d696e69-444c-164e-9d41-b827eb7c0d1a::urn:schemas-upnp-org:device:MediaServer:1\r\n\
EXT:\r\n\
SERVER: Raspbian DLNADOC/1.50 UPnP/1.0 MiniDLNA/1.3.0\r\n\
LOCATION: http://192.168.0.181:8200/rootDesc.xml\r\n\
Content-Length: 0\r\n\r\n";

/// M-SEARCH answer from a renderer that ignored the search target.
pub const SSDP_RENDERER_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
CACHE-CONTROL: max-age=1800\r\n\
ST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
USN: uuid:RINCON_000E58A0123401400::urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
LOCATION: http://192.168.0.50:1400/xml/device_description.xml\r\n\r\n";

/// minidlna root description with ConnectionManager listed first.
pub const DEVICE_DESCRIPTION_MINIDLNA: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaServer:1</deviceType>
    <friendlyName>pi: minidlna</friendlyName>
    <manufacturer>Justin Maggard</manufacturer>
    <modelName>Windows Media Connect compatible (MiniDLNA)</modelName>
    <UDN>uuid:4d696e69-444c-164e-9d41-b827eb7c0d1a</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ConnectionManager:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:ConnectionManager</serviceId>
        <controlURL>/ctl/ConnectionMgr</controlURL>
        <eventSubURL>/evt/ConnectionMgr</eventSubURL>
        <SCPDURL>/ConnectionMgr.xml</SCPDURL>
      </service>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ContentDirectory:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:ContentDirectory</serviceId>
        <controlURL>/ctl/ContentDir</controlURL>
        <eventSubURL>/evt/ContentDir</eventSubURL>
        <SCPDURL>/ContentDir.xml</SCPDURL>
      </service>
    </serviceList>
  </device>
</root>"#;

/// Description that relies on `URLBase` and a relative control path.
pub const DEVICE_DESCRIPTION_WITH_URL_BASE: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <URLBase>http://10.0.0.7:50001/</URLBase>
  <device>
    <friendlyName>NAS &amp; Music</friendlyName>
    <UDN>uuid:00113213-nas0-0001</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ContentDirectory:2</serviceType>
        <controlURL>ContentDirectory/control</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#;

/// Description of a device that only renders.
pub const DEVICE_DESCRIPTION_NO_CONTENT_DIRECTORY: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <friendlyName>Kitchen</friendlyName>
    <UDN>uuid:kitchen</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:AVTransport:1</serviceType>
        <controlURL>/MediaRenderer/AVTransport/Control</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#;

/// BrowseResponse with a container, a playable item and an item without `res`.
pub const BROWSE_RESPONSE_MIXED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<s:Body><u:BrowseResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1">
<Result>&lt;DIDL-Lite xmlns:dc=&quot;http://purl.org/dc/elements/1.1/&quot; xmlns:upnp=&quot;urn:schemas-upnp-org:metadata-1-0/upnp/&quot; xmlns=&quot;urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/&quot;&gt;&lt;container id=&quot;64$0&quot; parentID=&quot;64&quot; restricted=&quot;1&quot; childCount=&quot;2&quot;&gt;&lt;dc:title&gt;Rock &amp;amp; Roll&lt;/dc:title&gt;&lt;upnp:class&gt;object.container.storageFolder&lt;/upnp:class&gt;&lt;/container&gt;&lt;item id=&quot;64$1&quot; parentID=&quot;64&quot; restricted=&quot;1&quot;&gt;&lt;dc:title&gt;Intro&lt;/dc:title&gt;&lt;upnp:class&gt;object.item.audioItem.musicTrack&lt;/upnp:class&gt;&lt;res size=&quot;3145728&quot; protocolInfo=&quot;http-get:*:audio/mpeg:*&quot;&gt;http://192.168.0.181:8200/MediaItems/21.mp3&lt;/res&gt;&lt;res protocolInfo=&quot;http-get:*:audio/mpeg:*&quot;&gt;http://192.168.0.181:8200/MediaItems/21-alt.mp3&lt;/res&gt;&lt;/item&gt;&lt;item id=&quot;64$2&quot; parentID=&quot;64&quot; restricted=&quot;1&quot;&gt;&lt;dc:title&gt;No Resource&lt;/dc:title&gt;&lt;upnp:class&gt;object.item.audioItem.musicTrack&lt;/upnp:class&gt;&lt;/item&gt;&lt;/DIDL-Lite&gt;</Result>
<NumberReturned>3</NumberReturned>
<TotalMatches>3</TotalMatches>
<UpdateID>12</UpdateID>
</u:BrowseResponse></s:Body></s:Envelope>"#;

/// Unescaped DIDL-Lite whose resource is a server-relative path.
pub const DIDL_WITH_RELATIVE_RES: &str = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"><item id="9" parentID="1" restricted="1"><dc:title>Relative</dc:title><res protocolInfo="http-get:*:audio/flac:*">/MediaItems/7.flac</res></item></DIDL-Lite>"#;

/// SOAP fault for a Browse on an unknown object.
pub const SOAP_FAULT_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<s:Body>
<s:Fault>
<faultcode>s:Client</faultcode>
<faultstring>UPnPError</faultstring>
<detail>
<UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
<errorCode>701</errorCode>
<errorDescription>No such object</errorDescription>
</UPnPError>
</detail>
</s:Fault>
</s:Body>
</s:Envelope>"#;
